//! Genres command implementation.

use marquee_core::Genre;

pub fn run() {
    for genre in Genre::ALL {
        println!("{}", genre);
    }
}
