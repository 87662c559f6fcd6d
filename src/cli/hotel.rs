use std::io::Write;

use anyhow::Context;
use chrono::NaiveDate;
use clap::Parser;
use deskwork::domain::hotel::{Guest, Hotel as HotelModel, Room};
use tracing::instrument;

/// Command arguments for `desk hotel`.
///
/// Runs a reservation walkthrough: search, book, list, cancel.
#[derive(Debug, Parser)]
pub struct Hotel {
    /// Highest nightly rate shown in the first search
    #[arg(long, default_value_t = 60.0)]
    max_rate: f64,

    /// Check-in date (YYYY-MM-DD)
    #[arg(long, default_value = "2025-12-20")]
    check_in: NaiveDate,

    /// Check-out date (YYYY-MM-DD)
    #[arg(long, default_value = "2025-12-23")]
    check_out: NaiveDate,
}

impl Hotel {
    #[instrument]
    pub fn run(self) -> anyhow::Result<()> {
        self.demo(&mut std::io::stdout())
    }

    fn demo(&self, out: &mut impl Write) -> anyhow::Result<()> {
        let mut hotel = HotelModel::new("Hotel Andes");
        hotel.add_room(Room::new(101, "single", 35.0)?)?;
        hotel.add_room(Room::new(102, "double", 55.0)?)?;
        hotel.add_room(Room::new(201, "suite", 120.0)?)?;

        writeln!(out, "{}", hotel.name())?;
        writeln!(out, "Available rooms (<= ${:.2}):", self.max_rate)?;
        for room in hotel.search(None, Some(self.max_rate)) {
            writeln!(out, " - {room}")?;
        }

        let guest = Guest::new("Adriel Sánchez", "1801234567", "+593-99-123-4567");
        let id = {
            let reservation = hotel
                .reserve(guest, 102, self.check_in, self.check_out)
                .context("failed to book room 102")?;
            writeln!(out, "\nReservation created:\n  {reservation}")?;
            reservation.id()
        };

        writeln!(out, "\nCurrent reservations:")?;
        for reservation in hotel.reservations() {
            writeln!(out, "  {reservation}")?;
        }

        writeln!(out, "\nCancelling reservation #{id}...")?;
        let outcome = if hotel.cancel(id).is_ok() { "success" } else { "failed" };
        writeln!(out, "Cancellation: {outcome}")?;

        writeln!(out, "\nAvailable rooms again:")?;
        for room in hotel.search(None, None) {
            writeln!(out, " - {room}")?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn hotel(check_in: &str, check_out: &str) -> Hotel {
        Hotel {
            max_rate: 60.0,
            check_in: check_in.parse().unwrap(),
            check_out: check_out.parse().unwrap(),
        }
    }

    #[test]
    fn walkthrough_books_and_cancels() {
        let mut out = Vec::new();

        hotel("2025-12-20", "2025-12-23").demo(&mut out).unwrap();

        let text = String::from_utf8(out).unwrap();
        assert!(text.contains(
            "Reservation #1 -> Adriel Sánchez in room 102 (2025-12-20 to 2025-12-23, 3 nights, $165.00)"
        ));
        assert!(text.contains("Cancellation: success"));
        assert!(text.ends_with("Room 201 (suite, $120.00/night, free)\n"));
    }

    #[test]
    fn reversed_dates_fail() {
        let mut out = Vec::new();
        let error = hotel("2025-12-23", "2025-12-20").demo(&mut out).unwrap_err();
        assert!(format!("{error:#}").contains("must be after check-in"));
    }
}
