//! Interactive shell over the finite-group analysis engine: reads
//! `Cmd[Arg]` lines from stdin and prints the formatted report each one
//! produces, exactly as `application.service.AppServise._exec_cmd` did for
//! its own analysis screen.

use std::io::{self, BufRead, Write};
use std::rc::Rc;

use group_core::matrix::{Matrix, MatrixClosureConfig};
use group_core::{MasterGroup, Service};
use num_complex::Complex64;

/// Builds the dihedral group of order 6 as a built-in demo group, named
/// `D3`, the way a first run of the original tool greeted a user with a
/// ready-made example before any generators of their own were supplied.
fn demo_master() -> Rc<MasterGroup> {
    let theta = 2.0 * std::f64::consts::PI / 3.0;
    let rotation = Matrix::from_row_slice(
        2,
        2,
        &[
            Complex64::new(theta.cos(), 0.0),
            Complex64::new(-theta.sin(), 0.0),
            Complex64::new(theta.sin(), 0.0),
            Complex64::new(theta.cos(), 0.0),
        ],
    );
    let reflection = Matrix::from_row_slice(
        2,
        2,
        &[
            Complex64::new(1.0, 0.0),
            Complex64::new(0.0, 0.0),
            Complex64::new(0.0, 0.0),
            Complex64::new(-1.0, 0.0),
        ],
    );

    let config = MatrixClosureConfig::new(1e-6, 1_000).expect("demo config is valid");
    let master =
        MasterGroup::generate(&[rotation, reflection], config).expect("demo generators close");
    let whole = master.whole_group().expect("the whole group is always closed");
    whole.rename("D3");
    master.register_name("D3", whole);
    master
}

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .init();

    let master = demo_master();
    let service = Service::new(master);

    println!("groupctl — finite-group analysis shell");
    println!("Built-in group: D3 (order 6). Try: ?[D3]");
    println!("Commands: ?, Elements, Table, ConjClass, ConjCount, Isomorphic, IsAbelian,");
    println!("          IsPerfect, IsSolvable, IsSimple, Center, Centrizer, Derived,");
    println!("          DerivedSeries, Normal, DirectDecompose, SemidirectDecompose, Decompose");

    let stdin = io::stdin();
    loop {
        print!("> ");
        io::stdout().flush().ok();
        let mut line = String::new();
        if stdin.lock().read_line(&mut line).unwrap_or(0) == 0 {
            break;
        }
        let line = line.trim();
        if line.is_empty() {
            continue;
        }
        if line == "quit" || line == "exit" {
            break;
        }
        match service.exec(line) {
            Ok(text) => println!("{text}"),
            Err(err) => println!("error: {err}"),
        }
    }
}
