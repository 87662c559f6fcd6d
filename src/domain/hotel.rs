//! Rooms, guests and reservations.

use std::fmt;

use chrono::NaiveDate;

/// Errors raised by the hotel.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum HotelError {
    #[error("room {0} already exists")]
    DuplicateRoom(u32),

    #[error("room {0} does not exist")]
    UnknownRoom(u32),

    #[error("room {0} is not available")]
    RoomOccupied(u32),

    #[error("check-out ({check_out}) must be after check-in ({check_in})")]
    InvalidStay {
        check_in: NaiveDate,
        check_out: NaiveDate,
    },

    #[error("nightly rate must be a non-negative number (got {0})")]
    InvalidRate(f64),

    #[error("no reservation with id {0}")]
    UnknownReservation(u64),
}

/// A bookable room.
#[derive(Debug, Clone, PartialEq)]
pub struct Room {
    number: u32,
    kind: String,
    nightly_rate: f64,
    available: bool,
}

impl Room {
    /// A free room.
    ///
    /// # Errors
    ///
    /// Returns [`HotelError::InvalidRate`] for a negative or non-finite rate.
    pub fn new(number: u32, kind: impl Into<String>, nightly_rate: f64) -> Result<Self, HotelError> {
        if !(nightly_rate.is_finite() && nightly_rate >= 0.0) {
            return Err(HotelError::InvalidRate(nightly_rate));
        }
        Ok(Self {
            number,
            kind: kind.into(),
            nightly_rate,
            available: true,
        })
    }

    #[must_use]
    pub const fn number(&self) -> u32 {
        self.number
    }

    #[must_use]
    pub fn kind(&self) -> &str {
        &self.kind
    }

    #[must_use]
    pub const fn nightly_rate(&self) -> f64 {
        self.nightly_rate
    }

    #[must_use]
    pub const fn is_available(&self) -> bool {
        self.available
    }
}

impl fmt::Display for Room {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let state = if self.available { "free" } else { "occupied" };
        write!(
            f,
            "Room {} ({}, ${:.2}/night, {state})",
            self.number, self.kind, self.nightly_rate
        )
    }
}

/// The person a reservation is for.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Guest {
    /// Full name.
    pub name: String,
    /// Identity document number.
    pub document: String,
    /// Contact phone.
    pub phone: String,
}

impl Guest {
    /// Creates a guest.
    #[must_use]
    pub fn new(
        name: impl Into<String>,
        document: impl Into<String>,
        phone: impl Into<String>,
    ) -> Self {
        Self {
            name: name.into(),
            document: document.into(),
            phone: phone.into(),
        }
    }
}

/// A confirmed booking of one room for a date range.
///
/// The nightly rate is captured when the booking is made.
#[derive(Debug, Clone, PartialEq)]
pub struct Reservation {
    id: u64,
    guest: Guest,
    room: u32,
    nightly_rate: f64,
    check_in: NaiveDate,
    check_out: NaiveDate,
}

impl Reservation {
    /// The reservation's id, unique within its hotel.
    #[must_use]
    pub const fn id(&self) -> u64 {
        self.id
    }

    /// Who the room is booked for.
    #[must_use]
    pub const fn guest(&self) -> &Guest {
        &self.guest
    }

    /// The booked room number.
    #[must_use]
    pub const fn room(&self) -> u32 {
        self.room
    }

    /// First night of the stay.
    #[must_use]
    pub const fn check_in(&self) -> NaiveDate {
        self.check_in
    }

    /// Departure day; not a night of the stay.
    #[must_use]
    pub const fn check_out(&self) -> NaiveDate {
        self.check_out
    }

    /// Nights between check-in and check-out. Always at least one.
    #[must_use]
    pub fn nights(&self) -> i64 {
        (self.check_out - self.check_in).num_days()
    }

    /// `nights * nightly_rate`.
    #[must_use]
    pub fn total(&self) -> f64 {
        #[allow(clippy::cast_precision_loss)]
        let nights = self.nights() as f64;
        nights * self.nightly_rate
    }
}

impl fmt::Display for Reservation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Reservation #{} -> {} in room {} ({} to {}, {} nights, ${:.2})",
            self.id,
            self.guest.name,
            self.room,
            self.check_in,
            self.check_out,
            self.nights(),
            self.total()
        )
    }
}

/// A hotel: its rooms and the reservations held against them.
#[derive(Debug, Clone)]
pub struct Hotel {
    name: String,
    rooms: Vec<Room>,
    reservations: Vec<Reservation>,
    next_id: u64,
}

impl Hotel {
    /// A hotel with no rooms.
    #[must_use]
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            rooms: Vec::new(),
            reservations: Vec::new(),
            next_id: 1,
        }
    }

    /// The hotel's name.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// All rooms, in the order they were added.
    #[must_use]
    pub fn rooms(&self) -> &[Room] {
        &self.rooms
    }

    /// Adds a room.
    ///
    /// # Errors
    ///
    /// Returns [`HotelError::DuplicateRoom`] if the number is taken.
    pub fn add_room(&mut self, room: Room) -> Result<(), HotelError> {
        if self.rooms.iter().any(|r| r.number == room.number) {
            return Err(HotelError::DuplicateRoom(room.number));
        }
        self.rooms.push(room);
        Ok(())
    }

    /// Available rooms, optionally restricted to a kind and a maximum rate.
    #[must_use]
    pub fn search(&self, kind: Option<&str>, max_rate: Option<f64>) -> Vec<&Room> {
        self.rooms
            .iter()
            .filter(|room| room.available)
            .filter(|room| kind.is_none_or(|kind| room.kind == kind))
            .filter(|room| max_rate.is_none_or(|max| room.nightly_rate <= max))
            .collect()
    }

    /// Books a room for a guest.
    ///
    /// # Errors
    ///
    /// Fails if the stay is empty or reversed, the room does not exist, or
    /// it is already occupied. Nothing changes on error.
    pub fn reserve(
        &mut self,
        guest: Guest,
        room_number: u32,
        check_in: NaiveDate,
        check_out: NaiveDate,
    ) -> Result<&Reservation, HotelError> {
        if check_out <= check_in {
            return Err(HotelError::InvalidStay {
                check_in,
                check_out,
            });
        }
        let room = self
            .rooms
            .iter_mut()
            .find(|room| room.number == room_number)
            .ok_or(HotelError::UnknownRoom(room_number))?;
        if !room.available {
            return Err(HotelError::RoomOccupied(room_number));
        }

        room.available = false;
        let reservation = Reservation {
            id: self.next_id,
            guest,
            room: room_number,
            nightly_rate: room.nightly_rate,
            check_in,
            check_out,
        };
        self.next_id += 1;
        tracing::debug!("reservation {} for room {room_number}", reservation.id);
        self.reservations.push(reservation);
        Ok(&self.reservations[self.reservations.len() - 1])
    }

    /// Cancels a reservation and frees its room.
    ///
    /// # Errors
    ///
    /// Returns [`HotelError::UnknownReservation`] if there is no such id.
    pub fn cancel(&mut self, id: u64) -> Result<Reservation, HotelError> {
        let index = self
            .reservations
            .iter()
            .position(|r| r.id == id)
            .ok_or(HotelError::UnknownReservation(id))?;
        let reservation = self.reservations.remove(index);
        if let Some(room) = self.rooms.iter_mut().find(|r| r.number == reservation.room) {
            room.available = true;
        }
        Ok(reservation)
    }

    /// Current reservations, oldest first.
    #[must_use]
    pub fn reservations(&self) -> &[Reservation] {
        &self.reservations
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn hotel() -> Hotel {
        let mut hotel = Hotel::new("Andes");
        hotel.add_room(Room::new(101, "single", 35.0).unwrap()).unwrap();
        hotel.add_room(Room::new(102, "double", 55.0).unwrap()).unwrap();
        hotel.add_room(Room::new(201, "suite", 120.0).unwrap()).unwrap();
        hotel
    }

    fn guest() -> Guest {
        Guest::new("Adriel Sánchez", "1801234567", "+593-99-123-4567")
    }

    #[test]
    fn duplicate_room_is_rejected() {
        let mut hotel = hotel();
        assert_eq!(
            hotel.add_room(Room::new(101, "single", 40.0).unwrap()),
            Err(HotelError::DuplicateRoom(101))
        );
    }

    #[test]
    fn search_filters_by_rate_and_kind() {
        let hotel = hotel();
        let cheap: Vec<_> = hotel.search(None, Some(60.0)).iter().map(|r| r.number()).collect();
        assert_eq!(cheap, [101, 102]);

        let suites: Vec<_> = hotel.search(Some("suite"), None).iter().map(|r| r.number()).collect();
        assert_eq!(suites, [201]);
    }

    #[test]
    fn reservation_totals_nights_times_rate() {
        let mut hotel = hotel();
        let reservation = hotel
            .reserve(guest(), 102, date(2025, 12, 20), date(2025, 12, 23))
            .unwrap();

        assert_eq!(reservation.id(), 1);
        assert_eq!(reservation.nights(), 3);
        assert!((reservation.total() - 165.0).abs() < f64::EPSILON);
    }

    #[test]
    fn occupied_room_cannot_be_booked_until_cancelled() {
        let mut hotel = hotel();
        let id = hotel
            .reserve(guest(), 102, date(2025, 12, 20), date(2025, 12, 23))
            .unwrap()
            .id();

        assert_eq!(
            hotel
                .reserve(guest(), 102, date(2025, 12, 24), date(2025, 12, 25))
                .unwrap_err(),
            HotelError::RoomOccupied(102)
        );
        assert!(hotel.search(None, None).iter().all(|r| r.number() != 102));

        hotel.cancel(id).unwrap();

        assert!(hotel.search(None, None).iter().any(|r| r.number() == 102));
        assert!(hotel.reservations().is_empty());
    }

    #[test]
    fn check_out_must_follow_check_in() {
        let mut hotel = hotel();
        let day = date(2025, 12, 20);
        assert!(matches!(
            hotel.reserve(guest(), 101, day, day),
            Err(HotelError::InvalidStay { .. })
        ));
        assert!(hotel.rooms()[0].is_available());
    }

    #[test]
    fn ids_are_per_hotel() {
        let mut first = hotel();
        let mut second = hotel();
        first
            .reserve(guest(), 101, date(2025, 1, 1), date(2025, 1, 2))
            .unwrap();
        let id = second
            .reserve(guest(), 101, date(2025, 1, 1), date(2025, 1, 2))
            .unwrap()
            .id();
        assert_eq!(id, 1);
    }

    #[test]
    fn unknown_room_and_reservation() {
        let mut hotel = hotel();
        assert_eq!(
            hotel
                .reserve(guest(), 999, date(2025, 1, 1), date(2025, 1, 2))
                .unwrap_err(),
            HotelError::UnknownRoom(999)
        );
        assert_eq!(hotel.cancel(7), Err(HotelError::UnknownReservation(7)));
    }
}
