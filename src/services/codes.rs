//! Short join codes for live quizzes and polls

use rand::Rng;

use crate::database::DatabaseError;
use crate::error::AppError;

pub const CODE_LENGTH: usize = 6;
const CODE_ALPHABET: &[u8] = b"ABCDEFGHIJKLMNOPQRSTUVWXYZ0123456789";

/// Attempts before giving up on finding a free code
pub const MAX_CODE_ATTEMPTS: usize = 10;

/// Random `[A-Z0-9]{6}` code
pub fn generate_code<R: Rng + ?Sized>(rng: &mut R) -> String {
    (0..CODE_LENGTH)
        .map(|_| CODE_ALPHABET[rng.random_range(0..CODE_ALPHABET.len())] as char)
        .collect()
}

/// Run `insert` with fresh codes until it does not hit a unique violation
pub fn insert_with_unique_code<T, F>(mut insert: F) -> Result<T, AppError>
where
    F: FnMut(String) -> Result<T, DatabaseError>,
{
    for attempt in 1..=MAX_CODE_ATTEMPTS {
        let code = generate_code(&mut rand::rng());
        match insert(code) {
            Ok(value) => return Ok(value),
            Err(e) if e.is_unique_violation() => {
                tracing::debug!(attempt, "Generated code already taken, retrying");
            }
            Err(e) => return Err(e.into()),
        }
    }

    Err(AppError::Internal(
        "Could not allocate a unique code".to_string(),
    ))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::database::connection::unique_violation;

    #[test]
    fn test_generate_code_shape() {
        let mut rng = rand::rng();
        for _ in 0..100 {
            let code = generate_code(&mut rng);
            assert_eq!(code.len(), CODE_LENGTH);
            assert!(code.chars().all(|c| c.is_ascii_uppercase() || c.is_ascii_digit()));
        }
    }

    #[test]
    fn test_insert_with_unique_code_passes_through_success() {
        let value = insert_with_unique_code(|code| Ok::<_, DatabaseError>(code.len())).unwrap();
        assert_eq!(value, CODE_LENGTH);
    }

    #[test]
    fn test_insert_with_unique_code_retries_on_conflict() {
        let mut seen = Vec::new();
        let code = insert_with_unique_code(|code| {
            seen.push(code.clone());
            if seen.len() < 3 {
                Err(unique_violation())
            } else {
                Ok(code)
            }
        })
        .unwrap();

        assert_eq!(seen.len(), 3);
        assert_eq!(seen.last(), Some(&code));
    }

    #[test]
    fn test_insert_with_unique_code_exhausts_attempts() {
        let result: Result<(), _> = insert_with_unique_code(|_| Err(unique_violation()));
        assert!(matches!(result, Err(AppError::Internal(_))));
    }

    #[test]
    fn test_insert_with_unique_code_propagates_other_errors() {
        let mut calls = 0;
        let result: Result<(), _> = insert_with_unique_code(|_| {
            calls += 1;
            Err(DatabaseError::ConnectionPoolError("pool exhausted".to_string()))
        });

        assert!(matches!(result, Err(AppError::Database(_))));
        assert_eq!(calls, 1);
    }
}
