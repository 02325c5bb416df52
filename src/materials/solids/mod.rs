pub mod corotated;
