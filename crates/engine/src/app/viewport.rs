pub const DEFAULT_MIN_VIEWPORT: (u32, u32) = (1300, 600);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Comparison {
    pub actual: u32,
    pub required: u32,
}

impl Comparison {
    pub fn passes(&self) -> bool {
        self.actual >= self.required
    }

    pub fn text(&self) -> String {
        format!("{}/{}", self.actual, self.required)
    }
}

/// Result of comparing the window's logical size against the minimum the
/// split view needs.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SizeCheck {
    pub width: Comparison,
    pub height: Comparison,
}

impl SizeCheck {
    pub fn new(actual: (u32, u32), required: (u32, u32)) -> Self {
        Self {
            width: Comparison {
                actual: actual.0,
                required: required.0,
            },
            height: Comparison {
                actual: actual.1,
                required: required.1,
            },
        }
    }

    pub fn passes(&self) -> bool {
        self.width.passes() && self.height.passes()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn small_window_fails_both_axes() {
        let check = SizeCheck::new((1000, 500), DEFAULT_MIN_VIEWPORT);
        assert!(!check.passes());
        assert!(!check.width.passes());
        assert!(!check.height.passes());
        assert_eq!(check.width.text(), "1000/1300");
        assert_eq!(check.height.text(), "500/600");
    }

    #[test]
    fn exact_minimum_passes() {
        assert!(SizeCheck::new((1300, 600), DEFAULT_MIN_VIEWPORT).passes());
    }

    #[test]
    fn one_short_axis_fails_the_check() {
        let check = SizeCheck::new((1400, 599), DEFAULT_MIN_VIEWPORT);
        assert!(check.width.passes());
        assert!(!check.height.passes());
        assert!(!check.passes());
    }
}
