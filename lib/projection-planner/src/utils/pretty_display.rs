use std::fmt::{Formatter as FmtFormatter, Result as FmtResult};

pub fn get_indent(depth: usize) -> String {
    "  ".repeat(depth)
}

pub trait PrettyDisplay {
    fn pretty_fmt(&self, f: &mut FmtFormatter<'_>, depth: usize) -> FmtResult;
}

/// Writes `items` as a comma separated list, without any surrounding brackets.
pub fn write_joined<'a, I>(f: &mut FmtFormatter<'_>, items: I) -> FmtResult
where
    I: IntoIterator<Item = &'a str>,
{
    for (index, item) in items.into_iter().enumerate() {
        if index > 0 {
            write!(f, ", ")?;
        }
        write!(f, "{item}")?;
    }

    Ok(())
}
