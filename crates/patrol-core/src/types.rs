use crate::error::CoreError;

/// Syncable collection names without database dependencies.
///
/// Closed set: a tombstone or sync request naming anything else is a client
/// error, not a new collection.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SyncTable {
    Users,
    Properties,
    Visits,
    UserVisits,
    PropertyVehicles,
}

impl SyncTable {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Users => "users",
            Self::Properties => "properties",
            Self::Visits => "visits",
            Self::UserVisits => "user_visits",
            Self::PropertyVehicles => "property_vehicles",
        }
    }
}

impl std::fmt::Display for SyncTable {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for SyncTable {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "users" => Ok(Self::Users),
            "properties" => Ok(Self::Properties),
            "visits" => Ok(Self::Visits),
            "user_visits" => Ok(Self::UserVisits),
            "property_vehicles" => Ok(Self::PropertyVehicles),
            other => Err(CoreError::ParseError(format!(
                "Unknown sync table: {other}"
            ))),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sync_table_round_trip() {
        for table in [
            SyncTable::Users,
            SyncTable::Properties,
            SyncTable::Visits,
            SyncTable::UserVisits,
            SyncTable::PropertyVehicles,
        ] {
            assert_eq!(table.as_str().parse::<SyncTable>().ok(), Some(table));
        }
    }

    #[test]
    fn test_unknown_table_is_a_parse_error() {
        assert!("garbage".parse::<SyncTable>().is_err());
        assert!("".parse::<SyncTable>().is_err());
    }
}
