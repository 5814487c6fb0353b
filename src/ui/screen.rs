use num_derive::FromPrimitive;

/// The two windows of the version 3-5 screen model.
#[derive(FromPrimitive, PartialEq, Eq, Debug, Clone, Copy)]
pub enum Screen {
    Upper = 1,
    Lower = 0,
}
