use crate::{Bar, WavePoint};

/// Rendering seam the chart pushes its series into.
///
/// Full replacements follow a history merge or a timeframe change;
/// single-item updates follow a live tick. An update whose time equals the
/// last item's time replaces it, a newer time appends.
pub trait RenderSink {
    fn set_full_data(&mut self, bars: &[Bar]);

    fn append_or_update_bar(&mut self, bar: &Bar);

    fn set_full_indicator(&mut self, points: &[WavePoint]);

    fn append_or_update_point(&mut self, point: &WavePoint);
}

impl<S: RenderSink + ?Sized> RenderSink for &mut S {
    fn set_full_data(&mut self, bars: &[Bar]) {
        (**self).set_full_data(bars);
    }

    fn append_or_update_bar(&mut self, bar: &Bar) {
        (**self).append_or_update_bar(bar);
    }

    fn set_full_indicator(&mut self, points: &[WavePoint]) {
        (**self).set_full_indicator(points);
    }

    fn append_or_update_point(&mut self, point: &WavePoint) {
        (**self).append_or_update_point(point);
    }
}
