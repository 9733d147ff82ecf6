use panel_solver::{solve, Cell, Color, Node, Puzzle};

fn main() {
    // +---+---+
    // | B | B |    S: start node (bottom left)
    // +---+---+    E: end node (top right)
    // | B | W |    B/W: black and white squares
    // S---+---+
    //
    // All squares in a region must share a colour, so the path has to fence
    // the white square off from the black ones.
    let mut puzzle = Puzzle::new(2, 2);
    puzzle.set_node((0, 2), Node::start());
    puzzle.set_node((2, 0), Node::end());
    puzzle.set_cell((0, 0), Cell::Square { color: Color::Black });
    puzzle.set_cell((1, 0), Cell::Square { color: Color::Black });
    puzzle.set_cell((0, 1), Cell::Square { color: Color::Black });
    puzzle.set_cell((1, 1), Cell::Square { color: Color::White });

    match solve(&puzzle, false) {
        Ok(solution) => {
            println!("{}", solution.message);
            println!("path: {:?}", solution.path);
            println!(
                "{} attempts in {:.3}s",
                solution.path_attempts,
                solution.time_taken.as_secs_f64()
            );
            for (i, area) in solution.areas.iter().enumerate() {
                let mut cells: Vec<_> = area.iter().map(|c| (c.x, c.y)).collect();
                cells.sort_unstable();
                println!("region {i}: {cells:?}");
            }
        }
        Err(err) => eprintln!("invalid puzzle: {err}"),
    }
}
