pub mod car_race;
pub mod chess;
pub mod sprites;
pub mod utils;
