use chrono::{DateTime, Duration, Timelike, Utc};

/// The daily judgement window, expressed in local wall-clock hours.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct JudgementWindow {
    pub start_hour: u32,
    pub end_hour: u32,
}

impl JudgementWindow {
    pub fn new(start_hour: u32, end_hour: u32) -> Self {
        Self { start_hour, end_hour }
    }

    /// Whether `now` falls inside the window, judged against the wall clock
    /// at `utc_offset_minutes` east of UTC. Half-open: the opening hour is
    /// inside, the closing hour is out.
    pub fn is_active(&self, now: DateTime<Utc>, utc_offset_minutes: i32) -> bool {
        let local = now + Duration::minutes(utc_offset_minutes as i64);
        let hour = local.hour();
        self.start_hour <= hour && hour < self.end_hour
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn at(h: u32, mi: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 1, 15, h, mi, 0).unwrap()
    }

    #[test]
    fn opening_hour_is_inside_closing_hour_is_out() {
        let window = JudgementWindow::new(6, 12);
        assert!(!window.is_active(at(5, 59), 0));
        assert!(window.is_active(at(6, 0), 0));
        assert!(window.is_active(at(11, 59), 0));
        assert!(!window.is_active(at(12, 0), 0));
    }

    #[test]
    fn offset_shifts_the_window_into_local_time() {
        let window = JudgementWindow::new(6, 12);
        // 05:30 UTC is 06:30 in a +60 zone — inside.
        assert!(window.is_active(at(5, 30), 60));
        // 11:30 UTC is 12:30 in a +60 zone — already out.
        assert!(!window.is_active(at(11, 30), 60));
    }

    #[test]
    fn offset_can_push_across_midnight() {
        let window = JudgementWindow::new(6, 12);
        // 23:30 UTC the previous day is 07:15 at +7:45.
        assert!(window.is_active(at(23, 30), 465));
    }
}
