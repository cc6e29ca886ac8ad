use crate::db::dao::DaoLayerError;
use crate::error::AppError;

/// Client-facing messages for each way a CRUD call can fail.
#[derive(Clone, Copy, Debug)]
pub struct CrudErrors {
    pub list_failed: &'static str,
    pub create_failed: &'static str,
    pub update_failed: &'static str,
    pub delete_failed: &'static str,
    pub not_found: &'static str,
}

impl Default for CrudErrors {
    fn default() -> Self {
        Self {
            list_failed: "List failed",
            create_failed: "Create failed",
            update_failed: "Update failed",
            delete_failed: "Delete failed",
            not_found: "Resource not found",
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum CrudOp {
    List,
    Create,
    Update,
    Delete,
}

impl CrudOp {
    pub fn as_str(self) -> &'static str {
        match self {
            CrudOp::List => "list",
            CrudOp::Create => "create",
            CrudOp::Update => "update",
            CrudOp::Delete => "delete",
        }
    }
}

/// Folds a data-layer error into the HTTP error set. Database errors keep
/// their cause in the log only; the caller sees the fixed per-operation
/// message.
pub fn map_dao_error(errors: &CrudErrors, op: CrudOp, err: DaoLayerError) -> AppError {
    match err {
        DaoLayerError::NotFound { .. } => AppError::not_found(errors.not_found),
        DaoLayerError::Db(db_err) => {
            tracing::error!(op = op.as_str(), error = %db_err, "database call failed");
            let message = match op {
                CrudOp::List => errors.list_failed,
                CrudOp::Create => errors.create_failed,
                CrudOp::Update => errors.update_failed,
                CrudOp::Delete => errors.delete_failed,
            };
            AppError::persistence(message)
        }
    }
}
