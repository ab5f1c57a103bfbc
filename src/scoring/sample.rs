use super::time::{RawTime, TimeParseError};

/// Collect the fitting sample from a race's raw times.
///
/// Drops absent and empty entries and anything that parses to zero or less,
/// keeping input order. A malformed time string fails the whole call.
pub fn fitting_sample<'a, I>(times: I) -> Result<Vec<f64>, TimeParseError>
where
    I: IntoIterator<Item = &'a RawTime>,
{
    let mut sample = Vec::new();
    for raw in times {
        if let Some(seconds) = raw.seconds()? {
            if seconds > 0.0 {
                sample.push(seconds);
            }
        }
    }
    Ok(sample)
}
