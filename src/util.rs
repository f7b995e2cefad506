//! Miscellaneous utilities.

use std::fmt;

/// Converts a slice of items to strings with a fallible function, and joins
/// them with `sep`.
///
/// Returns `Ok` if all elements convert successfully. Otherwise, returns the
/// `Err` for the first failed conversion.
pub fn try_join<'a, T, F, Error>(items: &'a [T], sep: &str, mut f: F) -> Result<String, Error>
where
    F: FnMut(&'a T) -> Result<String, Error>,
{
    let mut s = String::new();
    for (i, item) in items.iter().enumerate() {
        if i != 0 {
            s.push_str(sep);
        }
        s.push_str(&f(item)?);
    }
    Ok(s)
}

/// Helper newtype for implementing `Display` on lists of items.
pub struct CommaSep<'a, T: 'a>(pub &'a [T]);

impl<'a, T> fmt::Display for CommaSep<'a, T>
where
    T: fmt::Display,
{
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        for (i, item) in self.0.iter().enumerate() {
            if i != 0 {
                write!(f, ", ")?;
            }
            item.fmt(f)?
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn join_all() {
        let joined: Result<String, ()> = try_join(&[1, 2, 3], ", ", |i| Ok(i.to_string()));
        assert_eq!(joined, Ok("1, 2, 3".to_owned()));
    }

    #[test]
    fn join_stops_at_first_error() {
        let mut seen = vec![];
        let joined = try_join(&[1, 2, 3], ", ", |&i| {
            seen.push(i);
            if i == 2 {
                Err(i)
            } else {
                Ok(i.to_string())
            }
        });
        assert_eq!(joined, Err(2));
        assert_eq!(seen, vec![1, 2]);
    }

    #[test]
    fn comma_sep() {
        assert_eq!(CommaSep(&["a", "b"]).to_string(), "a, b");
        assert_eq!(CommaSep::<&str>(&[]).to_string(), "");
    }
}
