//! Default-privilege operations

use crate::catalog::default_grant::DefaultGrant;

#[derive(Debug, Clone)]
pub enum DefaultGrantOperation {
    Grant { grant: DefaultGrant },
    Revoke { grant: DefaultGrant },
}
