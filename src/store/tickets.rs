use super::DataStore;
use crate::errors::AppError;
use crate::models::{ServiceTicket, TicketStatus};

impl DataStore {
    /// Move a completed ticket back to `in_progress`.
    pub async fn reopen_ticket(&self, id: &str) -> Result<ServiceTicket, AppError> {
        self.tickets
            .mutate(|tickets| {
                let ticket = tickets
                    .iter_mut()
                    .find(|t| t.id == id)
                    .ok_or_else(|| AppError::NotFound("Servis nije pronađen".to_string()))?;

                if ticket.status != TicketStatus::Completed {
                    return Err(AppError::Validation(
                        "Samo završeni servisi mogu biti ponovo otvoreni".to_string(),
                    ));
                }

                ticket.reopen();
                Ok(ticket.clone())
            })
            .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn ticket(id: &str, status: &str) -> ServiceTicket {
        serde_json::from_value(serde_json::json!({
            "id": id,
            "serviceNumber": format!("T007_{}", id),
            "deviceCode": "DEV-1",
            "technicianId": "7",
            "technicianName": "Marko",
            "startTime": "2024-05-01T08:00:00.000Z",
            "endTime": "2024-05-01T09:00:00.000Z",
            "durationMinutes": 60,
            "status": status,
            "operations": [],
            "spareParts": []
        }))
        .unwrap()
    }

    #[tokio::test]
    async fn test_reopen_only_completed() {
        let temp_dir = TempDir::new().unwrap();
        let store = DataStore::open(temp_dir.path()).await.unwrap();
        store
            .tickets
            .set(vec![ticket("1001", "completed"), ticket("1002", "in_progress")])
            .await
            .unwrap();

        let reopened = store.reopen_ticket("1001").await.unwrap();
        assert_eq!(reopened.status, TicketStatus::InProgress);
        assert!(reopened.end_time.is_none());
        assert!(reopened.duration_minutes.is_none());

        assert!(matches!(
            store.reopen_ticket("1002").await,
            Err(AppError::Validation(_))
        ));
        assert!(matches!(
            store.reopen_ticket("9999").await,
            Err(AppError::NotFound(_))
        ));
    }
}
