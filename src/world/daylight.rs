/// Day/night cycle used as the illumination predicate for solar producers.
///
/// A day of `day_length_secs` is lit between `sunrise_frac` (inclusive) and
/// `sunset_frac` (exclusive), both expressed as fractions of the day.
///
/// # Examples
///
/// ```
/// use outpost_power::world::Daylight;
///
/// let day = Daylight::new(100.0, 0.25, 0.75);
/// assert!(!day.is_lit(10.0));
/// assert!(day.is_lit(50.0));
/// assert!(day.is_lit(150.0));
/// ```
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Daylight {
    day_length_secs: f64,
    sunrise_frac: f64,
    sunset_frac: f64,
}

impl Daylight {
    /// # Panics
    ///
    /// Panics if `day_length_secs <= 0` or the fractions are not ordered
    /// within `[0, 1]`.
    pub fn new(day_length_secs: f64, sunrise_frac: f64, sunset_frac: f64) -> Self {
        assert!(day_length_secs > 0.0);
        assert!((0.0..=1.0).contains(&sunrise_frac) && (0.0..=1.0).contains(&sunset_frac));
        assert!(sunrise_frac <= sunset_frac);
        Self {
            day_length_secs,
            sunrise_frac,
            sunset_frac,
        }
    }

    /// A sky that never sets.
    pub fn always_lit() -> Self {
        Self::new(1.0, 0.0, 1.0)
    }

    /// Fraction of the current day elapsed at `time_secs`.
    pub fn phase(&self, time_secs: f64) -> f64 {
        time_secs.rem_euclid(self.day_length_secs) / self.day_length_secs
    }

    pub fn is_lit(&self, time_secs: f64) -> bool {
        let phase = self.phase(time_secs);
        phase >= self.sunrise_frac && phase < self.sunset_frac
    }
}

impl Default for Daylight {
    fn default() -> Self {
        Self::always_lit()
    }
}

#[cfg(test)]
mod tests {
    use super::Daylight;

    #[test]
    fn always_lit_is_lit_everywhere() {
        let d = Daylight::always_lit();
        for t in [0.0, 0.3, 0.999, 12.5, 1e6] {
            assert!(d.is_lit(t));
        }
    }

    #[test]
    fn sunset_is_exclusive() {
        let d = Daylight::new(24.0, 0.25, 0.75);
        assert!(d.is_lit(6.0));
        assert!(!d.is_lit(18.0));
        assert!(!d.is_lit(23.0));
    }

    #[test]
    fn negative_time_wraps() {
        let d = Daylight::new(24.0, 0.25, 0.75);
        assert!(d.is_lit(-12.0));
    }

    #[test]
    #[should_panic]
    fn inverted_window_panics() {
        Daylight::new(24.0, 0.8, 0.2);
    }
}
