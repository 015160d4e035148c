/// The output of a command, printed as pretty JSON on stdout
pub trait Displayable {
    fn display(&self);
}

impl<T: serde::Serialize> Displayable for T {
    fn display(&self) {
        match serde_json::to_string_pretty(self) {
            Ok(s) => println!("{s}"),
            Err(e) => log::error!("Could not serialize the command output: {e}"),
        }
    }
}
