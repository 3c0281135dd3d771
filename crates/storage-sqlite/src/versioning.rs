//! Outcomes of compare-and-swap and soft-delete statements.

use goalledger_core::errors::{DatabaseError, Error, Result};

/// Maps the `version` returned by a conditional `UPDATE ... RETURNING` to the
/// new version. No row means the id, owner, version or live check failed.
pub(crate) fn cas_version(returned: Option<i32>, entity: &str, id: i64, expected: i32) -> Result<i32> {
    returned.ok_or_else(|| {
        DatabaseError::EditConflict(format!(
            "{entity} {id} is no longer at version {expected}"
        ))
        .into()
    })
}

/// A soft delete that touched no row found nothing live to delete.
pub(crate) fn soft_delete_outcome(affected: usize, not_found: impl FnOnce() -> Error) -> Result<()> {
    if affected == 0 {
        Err(not_found())
    } else {
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use goalledger_core::goals::GoalError;

    #[test]
    fn missing_row_is_an_edit_conflict() {
        assert_eq!(cas_version(Some(4), "goal", 1, 3).unwrap(), 4);
        let err = cas_version(None, "goal", 1, 3).unwrap_err();
        assert!(err.is_conflict());
        assert!(err.to_string().contains("goal 1"));
    }

    #[test]
    fn untouched_soft_delete_is_not_found() {
        assert!(soft_delete_outcome(1, || GoalError::NotFound(1).into()).is_ok());
        let err = soft_delete_outcome(0, || GoalError::NotFound(1).into()).unwrap_err();
        assert!(err.is_not_found());
    }
}
