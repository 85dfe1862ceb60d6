//! Arm the failsafe for the whole process.
//!
//! Run with `--raise` in the arguments to watch an uncaught panic get
//! logged and turned into exit code 1:
//!
//! ```text
//! cargo run --example guarded -- --raise
//! ```

fn main()
{
    let undo = endstop::install();
    endstop::route_panics();
    println!("process is guarded; uncaught panics now log and exit(1)");

    if std::env::args().any(|arg| arg == "--raise") {
        panic!("demonstration fault");
    }

    undo.undo();
    println!("handler removed again; exiting normally");
}
