//! Unit tests for error classification and conversions.

use ridersaid_errors::{
    Result,
    access::AccessError,
    common::{ErrorKind, ErrorSeverity, ResultExt, RidersAidError},
    error_context,
    store::StoreError,
    validation::ValidationError,
};

mod taxonomy {
    use super::*;

    #[test]
    fn test_every_user_facing_outcome_is_distinct() -> Result<()> {
        let errors: Vec<(RidersAidError, ErrorKind)> = vec![
            (AccessError::Unauthenticated.into(), ErrorKind::Unauthenticated),
            (AccessError::ProfileNotFound.into(), ErrorKind::NotFound),
            (
                AccessError::record_not_found("allergies", "x").into(),
                ErrorKind::NotFound,
            ),
            (
                ValidationError::required("name").into(),
                ErrorKind::ValidationFailed,
            ),
            (
                StoreError::unavailable("refused").into(),
                ErrorKind::StoreUnavailable,
            ),
            (
                AccessError::TokenCollision { attempts: 3 }.into(),
                ErrorKind::Conflict,
            ),
            (RidersAidError::config("bad bind"), ErrorKind::Config),
        ];

        for (err, kind) in errors {
            assert_eq!(err.kind(), kind, "unexpected kind for {err}");
        }
        Ok(())
    }

    #[test]
    fn test_store_unavailable_never_reads_as_not_found() -> Result<()> {
        let err: RidersAidError = StoreError::snapshot("/tmp/x.json", "disk full").into();
        assert_ne!(err.kind(), ErrorKind::NotFound);
        assert!(err.is_transient());
        Ok(())
    }

    #[test]
    fn test_config_errors_are_critical() -> Result<()> {
        assert_eq!(
            RidersAidError::config("missing origin").severity(),
            ErrorSeverity::Critical
        );
        Ok(())
    }
}

mod context {
    use super::*;

    #[test]
    fn test_error_context_macro() -> Result<()> {
        let ctx = error_context!("rotate_token", "profile_id" => "u-1");
        let text = ctx.to_string();
        assert!(text.contains("rotate_token"));
        assert!(text.contains("profile_id: u-1"));
        Ok(())
    }

    #[test]
    fn test_context_on_other_error() -> Result<()> {
        let result: std::result::Result<(), RidersAidError> =
            Err(RidersAidError::other("boom"));
        match result.context(error_context!("load", "file" => "a.json")) {
            Err(RidersAidError::Other(msg)) => {
                assert!(msg.contains("load"));
                assert!(msg.contains("boom"));
            }
            other => panic!("unexpected result: {other:?}"),
        }
        Ok(())
    }
}
