pub mod health;
pub mod messages;
pub mod visits;

use serde::Deserialize;

use crate::error::AppError;
use crate::ledger::Limit;

#[derive(Debug, Default, Deserialize)]
pub struct ListParams {
    limit: Option<String>,
}

impl ListParams {
    /// Parse `?limit=`; absent means `default`, zero or non-numeric is rejected.
    pub fn resolve(&self, default: Limit) -> Result<Limit, AppError> {
        match self.limit.as_deref().map(str::trim) {
            None | Some("") => Ok(default),
            Some(raw) => raw
                .parse::<u32>()
                .ok()
                .and_then(Limit::new)
                .ok_or(AppError::InvalidLimit),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn params(limit: Option<&str>) -> ListParams {
        ListParams {
            limit: limit.map(String::from),
        }
    }

    #[test]
    fn missing_limit_uses_default() {
        assert_eq!(params(None).resolve(Limit::DEFAULT).unwrap(), Limit::DEFAULT);
        assert_eq!(params(Some("")).resolve(Limit::DEFAULT).unwrap(), Limit::DEFAULT);
    }

    #[test]
    fn explicit_limit_is_parsed() {
        assert_eq!(params(Some("3")).resolve(Limit::DEFAULT).unwrap().get(), 3);
    }

    #[test]
    fn zero_negative_and_garbage_are_rejected() {
        for raw in ["0", "-1", "ten"] {
            assert!(matches!(
                params(Some(raw)).resolve(Limit::DEFAULT),
                Err(AppError::InvalidLimit)
            ));
        }
    }
}
