//! Table landing
//!
//! Checks whether the scanned table is free before the customer starts
//! ordering. The check is advisory: when the availability lookup itself fails
//! the customer may still start.

use shared::TableAvailability;

use crate::api::TableService;
use crate::cart::{CartStore, SessionStorage, TableId};
use crate::{FetchError, TableError};

#[derive(Debug, Clone)]
pub struct TableLanding {
    table_id: TableId,
    availability: Option<TableAvailability>,
    error: Option<FetchError>,
    checked: bool,
}

impl TableLanding {
    pub fn new(table_id: impl Into<TableId>) -> Self {
        Self {
            table_id: table_id.into(),
            availability: None,
            error: None,
            checked: false,
        }
    }

    pub fn table_id(&self) -> TableId {
        self.table_id
    }

    pub fn availability(&self) -> Option<&TableAvailability> {
        self.availability.as_ref()
    }

    pub fn error(&self) -> Option<&FetchError> {
        self.error.as_ref()
    }

    /// Query the Table Availability Service; call again to refresh
    pub async fn check<T: TableService + ?Sized>(&mut self, tables: &T) {
        match tables.immediate_availability(self.table_id.get()).await {
            Ok(availability) => {
                tracing::debug!(
                    table_id = %self.table_id,
                    available = availability.available,
                    "Table availability checked"
                );
                self.availability = Some(availability);
                self.error = None;
            }
            Err(e) => {
                tracing::warn!(table_id = %self.table_id, error = %e, "Table availability check failed");
                self.error = Some(FetchError::new("Unable to verify table availability"));
            }
        }
        self.checked = true;
    }

    /// Known to be taken by someone else
    pub fn is_blocked(&self) -> bool {
        self.availability.as_ref().is_some_and(|a| !a.available)
    }

    pub fn can_start(&self) -> bool {
        self.checked && !self.is_blocked()
    }

    pub fn status_message(&self) -> String {
        if !self.checked {
            return "Checking table status...".to_string();
        }
        if self.error.is_some() {
            return "Unable to verify table status".to_string();
        }
        match &self.availability {
            Some(a) if !a.available => {
                let eta = a
                    .estimated_available_time
                    .map(|t| t.with_timezone(&chrono::Local).format("%H:%M").to_string())
                    .unwrap_or_else(|| "Unknown".to_string());
                format!(
                    "Table is currently {}. Estimated available: {eta}",
                    a.status()
                )
            }
            _ => "Table is ready for ordering!".to_string(),
        }
    }

    /// Bind the cart to this table
    pub fn start_ordering<S: SessionStorage>(
        &self,
        cart: &mut CartStore<S>,
    ) -> Result<(), TableError> {
        if let Some(a) = self.availability.as_ref().filter(|a| !a.available) {
            return Err(TableError::Unavailable {
                table_id: self.table_id.get(),
                status: a.status().to_string(),
                estimated_available_time: a.estimated_available_time,
            });
        }
        cart.set_table(self.table_id)?;
        Ok(())
    }
}
