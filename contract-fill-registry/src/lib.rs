//! The four built-in contract types.
//!
//! | Code | Contract | Standard |
//! |---|---|---|
//! | `tigong` | 数据提供合同 | GF-2025-2615 |
//! | `weituo` | 数据委托处理服务合同 | GF-2025-2616 |
//! | `ronghe` | 数据融合开发合同 | GF-2025-2617 |
//! | `zhongjie` | 数据中介服务合同 | GF-2025-2618 |
//!
//! Definitions are TOML files compiled into the binary and validated the first
//! time [`builtin`] is called.

use contract_fill::{DefinitionError, Registry};
use once_cell::sync::OnceCell;

/// Raw definition sources, in catalog order.
pub const SOURCES: [(&str, &str); 4] = [
    ("tigong", include_str!("../contracts/tigong.toml")),
    ("weituo", include_str!("../contracts/weituo.toml")),
    ("ronghe", include_str!("../contracts/ronghe.toml")),
    ("zhongjie", include_str!("../contracts/zhongjie.toml")),
];

static BUILTIN: OnceCell<Registry> = OnceCell::new();

/// The process-wide built-in registry.
pub fn builtin() -> Result<&'static Registry, DefinitionError> {
    BUILTIN.get_or_try_init(|| {
        let sources: Vec<&str> = SOURCES.iter().map(|(_, toml)| *toml).collect();
        Registry::from_toml_strs(&sources)
    })
}

#[cfg(test)]
mod tests {
    mod catalog;
    mod scenarios;
}
