//! Histogram output seam.
//!
//! The core never reads a histogram back. Every fill is fire-and-forget through
//! [`HistogramSink`], so the host decides binning, storage and rendering.

use alloc::vec::Vec;

use crate::spectra::Spectrum;

/// Receiver of histogram fills.
pub trait HistogramSink {
    /// One-dimensional fill.
    fn plot(&mut self, id: Spectrum, value: f64);

    /// Two-dimensional fill.
    fn plot_2d(&mut self, id: Spectrum, x: f64, y: f64);

    /// Two-dimensional fill with an explicit weight.
    fn increment(&mut self, id: Spectrum, x: f64, y: f64, amount: f64);
}

impl<S: HistogramSink + ?Sized> HistogramSink for &mut S {
    fn plot(&mut self, id: Spectrum, value: f64) {
        (**self).plot(id, value)
    }

    fn plot_2d(&mut self, id: Spectrum, x: f64, y: f64) {
        (**self).plot_2d(id, x, y)
    }

    fn increment(&mut self, id: Spectrum, x: f64, y: f64, amount: f64) {
        (**self).increment(id, x, y, amount)
    }
}

/// Sink that drops every fill.
#[derive(Clone, Copy, Debug, Default)]
pub struct NullSink;

impl HistogramSink for NullSink {
    fn plot(&mut self, _id: Spectrum, _value: f64) {}
    fn plot_2d(&mut self, _id: Spectrum, _x: f64, _y: f64) {}
    fn increment(&mut self, _id: Spectrum, _x: f64, _y: f64, _amount: f64) {}
}

/// One recorded fill.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum Fill {
    /// [`HistogramSink::plot`].
    Plot(Spectrum, f64),
    /// [`HistogramSink::plot_2d`].
    Plot2d(Spectrum, f64, f64),
    /// [`HistogramSink::increment`].
    Increment(Spectrum, f64, f64, f64),
}

impl Fill {
    /// Target spectrum.
    pub fn spectrum(&self) -> Spectrum {
        match *self {
            Fill::Plot(id, _) | Fill::Plot2d(id, _, _) | Fill::Increment(id, _, _, _) => id,
        }
    }
}

/// Sink that keeps every fill in call order. Used by tests and the demo.
#[derive(Clone, Debug, Default)]
pub struct RecordingSink {
    fills: Vec<Fill>,
}

impl RecordingSink {
    /// Empty recorder.
    pub fn new() -> Self {
        Self::default()
    }

    /// Fills in call order.
    pub fn fills(&self) -> &[Fill] {
        &self.fills
    }

    /// Fills aimed at `id`.
    pub fn fills_for(&self, id: Spectrum) -> impl Iterator<Item = &Fill> + '_ {
        self.fills.iter().filter(move |f| f.spectrum() == id)
    }

    /// Number of fills aimed at `id`.
    pub fn count(&self, id: Spectrum) -> usize {
        self.fills_for(id).count()
    }

    /// One-dimensional values filled into `id`.
    pub fn values(&self, id: Spectrum) -> Vec<f64> {
        self.fills_for(id)
            .filter_map(|f| match *f {
                Fill::Plot(_, v) => Some(v),
                _ => None,
            })
            .collect()
    }

    /// Forget everything recorded so far.
    pub fn clear(&mut self) {
        self.fills.clear();
    }
}

impl HistogramSink for RecordingSink {
    fn plot(&mut self, id: Spectrum, value: f64) {
        self.fills.push(Fill::Plot(id, value));
    }

    fn plot_2d(&mut self, id: Spectrum, x: f64, y: f64) {
        self.fills.push(Fill::Plot2d(id, x, y));
    }

    fn increment(&mut self, id: Spectrum, x: f64, y: f64, amount: f64) {
        self.fills.push(Fill::Increment(id, x, y, amount));
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn fill_through<S: HistogramSink>(mut sink: S) {
        sink.plot(Spectrum::SiliconMultiplicity, 2.0);
        sink.plot_2d(Spectrum::TotalVsCycleNumber, 10.0, 3.0);
    }

    #[test]
    fn test_recording_sink_through_mut_ref() {
        let mut rec = RecordingSink::new();
        fill_through(&mut rec);
        assert_eq!(rec.fills().len(), 2);
        assert_eq!(rec.values(Spectrum::SiliconMultiplicity), [2.0]);
        assert_eq!(rec.count(Spectrum::TotalVsCycleNumber), 1);
        rec.clear();
        assert!(rec.fills().is_empty());
    }

    #[test]
    fn test_null_sink_accepts_everything() {
        fill_through(NullSink);
    }
}
