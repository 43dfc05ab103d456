//! Pattern glyphs, one string per row: `O` alive, anything else dead.
//!
//! Row index is x, column index is y.

/// Period-4 spaceship, travels one cell down and right per period.
pub(crate) const GLIDER: &[&str] = &[
    "...",
    ".O.",
    "..O",
    "OOO",
];

/// Period-2 oscillator.
pub(crate) const BLINKER: &[&str] = &[
    "...",
    "OOO",
];

/// Period-2 oscillator.
pub(crate) const TOAD: &[&str] = &[
    "....",
    ".OOO",
    "OOO.",
];

/// Period-2 oscillator.
pub(crate) const BEACON: &[&str] = &[
    "....",
    "OO..",
    "OO..",
    "..OO",
    "..OO",
];

/// Glider gun.
pub(crate) const GLIDER_GUN: &[&str] = &[
    "........................................",
    "........................................",
    "........................................",
    "........................................",
    "........................................",
    "............O...........................",
    "............OOOO........................",
    ".............OOOO..........OO...........",
    "..OO.........O..O.........O.O...........",
    "..OO.........OOOO........OOO........OO..",
    "............OOOO........OOO.........OO..",
    "............O............OOO............",
    "..........................O.O...........",
    "...........................OO...........",
    "........................................",
    "........................................",
    "........................................",
    "........................................",
];

/// Glider synthesis that assembles a loafer.
pub(crate) const LOAFER_SYNTH: &[&str] = &[
    ".................................O",
    "...............................OO.",
    "................................OO",
    ".........O........................",
    ".O........O.......................",
    "..O.....OOO.......................",
    "OOO...............................",
    "..................................",
    "..................................",
    ".....O............................",
    "......O...........................",
    "....OOO...........................",
    "........................O.O.......",
    ".........................OO.......",
    ".........................O........",
    "..................................",
    "...........................O.O....",
    "...........................OO.....",
    "............................O.....",
    "...............................OOO",
    "...............................O..",
    "................................O.",
    "..................................",
    "..................................",
    "..................................",
    "..................................",
    "..................................",
    "..................................",
    ".....OO...........................",
    "......OO..........................",
    ".....O............................",
];
