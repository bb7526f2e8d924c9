pub mod temperature {
    use crate::weather::Units;

    pub fn c2f(temp_c: f64) -> f64 {
        temp_c * 9.0 / 5.0 + 32.0
    }

    /// Convert a Celsius reading into `units`.
    pub fn display(temp_c: f64, units: Units) -> f64 {
        match units {
            Units::Metric => temp_c,
            Units::Imperial => c2f(temp_c),
        }
    }

    pub fn format(temp_c: f64, units: Units) -> String {
        let symbol = match units {
            Units::Metric => "C",
            Units::Imperial => "F",
        };
        format!("{:.1} {symbol}", display(temp_c, units))
    }

    #[test]
    fn test_temperature() {
        assert_eq!(c2f(-40.0), -40.0);
        assert_eq!(c2f(0.0), 32.0);
        assert_eq!(c2f(100.0), 212.0);
    }

    #[test]
    fn test_format() {
        assert_eq!(format(-3.26, Units::Metric), "-3.3 C");
        assert_eq!(format(10.0, Units::Imperial), "50.0 F");
    }
}
