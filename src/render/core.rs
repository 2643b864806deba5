use std::fmt::{self, Write};

use crate::geometry::Position;
use crate::layout::GridEngine;

/// Write the occupancy table of `engine`: physical columns across, rows
/// down, each cell showing the occupying slot or `--` when empty.
///
/// ```text
///  #| 0  1  2
///  -----------
///  0| 00 02 02
///  1| 01 -- 03
/// ```
pub fn write_table<T, W: Write>(engine: &GridEngine<T>, out: &mut W) -> fmt::Result {
    let extent = engine.extent();

    out.write_str("\n #|")?;
    let mut border = String::from("\n --");
    for x in 0..extent.w {
        write!(out, " {x:>2}")?;
        border.push_str("---");
    }
    out.write_str(&border)?;

    for y in 0..extent.h {
        write!(out, "\n{y:>2}|")?;
        for x in 0..extent.w {
            match engine.slot_at(Position::new(x, y)) {
                Some(slot) => write!(out, " {slot:02}")?,
                None => out.write_str(" --")?,
            }
        }
    }
    out.write_char('\n')
}

pub fn render_table<T>(engine: &GridEngine<T>) -> String {
    let mut out = String::new();
    // Writing into a String cannot fail.
    let _ = write_table(engine, &mut out);
    out
}

impl<T> fmt::Display for GridEngine<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write_table(self, f)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::axis::Direction;
    use crate::config::GridOptions;
    use crate::item::GridItem;

    fn items() -> Vec<GridItem<()>> {
        vec![
            GridItem::at(0, 0, 1, 1, ()),
            GridItem::at(0, 1, 1, 1, ()),
            GridItem::at(1, 0, 2, 1, ()),
        ]
    }

    #[test]
    fn horizontal_table() {
        let engine = GridEngine::new(items(), GridOptions::new(2)).unwrap();
        let expected = "\n #|  0  1  2\n -----------\n 0| 00 02 02\n 1| 01 -- --\n";
        assert_eq!(engine.to_string(), expected);
        assert_eq!(render_table(&engine), expected);
    }

    #[test]
    fn vertical_table_transposes() {
        let options = GridOptions::new(2).with_direction(Direction::Vertical);
        let engine = GridEngine::new(
            vec![GridItem::at(0, 0, 1, 2, ()), GridItem::at(1, 0, 1, 1, ())],
            options,
        )
        .unwrap();
        let expected = "\n #|  0  1\n --------\n 0| 00 01\n 1| 00 --\n";
        assert_eq!(engine.to_string(), expected);
    }

    #[test]
    fn empty_grid_renders_header_only() {
        let engine = GridEngine::<()>::new(Vec::new(), GridOptions::new(1)).unwrap();
        assert_eq!(engine.to_string(), "\n #|\n --\n 0|\n");
    }
}
