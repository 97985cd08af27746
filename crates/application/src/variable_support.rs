//! Variable-as-datasource capability

use orads_domain::VariableSupportType;

/// Declares how a data source can back dashboard variables.
pub trait VariableSupport: Send + Sync {
    /// Returns the capability tag reported to the host.
    fn support_type(&self) -> VariableSupportType;
}

/// Marks the data source as a source of variable values through its own
/// query path.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DataSourceVariableSupport;

impl DataSourceVariableSupport {
    /// Creates the declaration.
    #[must_use]
    pub const fn new() -> Self {
        Self
    }
}

impl VariableSupport for DataSourceVariableSupport {
    fn support_type(&self) -> VariableSupportType {
        VariableSupportType::Datasource
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_always_datasource() {
        let support = DataSourceVariableSupport::new();
        for _ in 0..3 {
            assert_eq!(support.support_type(), VariableSupportType::Datasource);
        }
        assert_eq!(support.support_type().as_str(), "datasource");
    }
}
