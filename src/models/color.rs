use serde::{Deserialize, Serialize};

/// Largest Euclidean distance between two colors in 8-bit RGB space: sqrt(3 * 255^2).
pub const MAX_RGB_DISTANCE: f64 = 441.672_955_930_063_7;

/// An 8-bit sRGB color.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Rgb {
    pub r: u8,
    pub g: u8,
    pub b: u8,
}

impl Rgb {
    pub const fn new(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b }
    }

    /// Euclidean distance in RGB space.
    pub fn distance(&self, other: &Rgb) -> f64 {
        let dr = f64::from(self.r) - f64::from(other.r);
        let dg = f64::from(self.g) - f64::from(other.g);
        let db = f64::from(self.b) - f64::from(other.b);
        (dr * dr + dg * dg + db * db).sqrt()
    }

    /// Rec. 601 luma, 0-255.
    pub fn luma(&self) -> f64 {
        0.299 * f64::from(self.r) + 0.587 * f64::from(self.g) + 0.114 * f64::from(self.b)
    }

    /// Uppercase `#RRGGBB`.
    pub fn to_hex(&self) -> String {
        format!("#{:02X}{:02X}{:02X}", self.r, self.g, self.b)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn hex_is_uppercase_and_padded() {
        assert_eq!(Rgb::new(245, 230, 211).to_hex(), "#F5E6D3");
        assert_eq!(Rgb::new(0, 10, 255).to_hex(), "#000AFF");
    }

    #[test]
    fn distance_is_symmetric_and_zero_on_self() {
        let a = Rgb::new(184, 134, 79);
        let b = Rgb::new(166, 124, 82);
        assert_eq!(a.distance(&a), 0.0);
        assert!((a.distance(&b) - b.distance(&a)).abs() < f64::EPSILON);
        assert!((a.distance(&b) - 433f64.sqrt()).abs() < 1e-9);
    }

    #[test]
    fn black_to_white_is_max_distance() {
        let d = Rgb::new(0, 0, 0).distance(&Rgb::new(255, 255, 255));
        assert!((d - MAX_RGB_DISTANCE).abs() < 1e-9);
    }

    #[test]
    fn luma_extremes() {
        assert_eq!(Rgb::new(0, 0, 0).luma(), 0.0);
        assert!((Rgb::new(255, 255, 255).luma() - 255.0).abs() < 1e-9);
    }
}
