//! Column-level grant operations

use crate::catalog::column_grant::ColumnGrant;

#[derive(Debug, Clone)]
pub enum ColumnGrantOperation {
    Grant { grant: ColumnGrant },
    Revoke { grant: ColumnGrant },
}
