use thiserror::Error;

#[derive(Debug, Error, PartialEq)]
pub enum LocatorError {
    #[error("latitude {0} outside [-90, 90]")]
    LatitudeOutOfRange(f64),
    #[error("longitude {0} outside [-180, 180]")]
    LongitudeOutOfRange(f64),
    #[error("unsupported locator precision {0}, expected 4 or 6")]
    UnsupportedPrecision(u8),
}
