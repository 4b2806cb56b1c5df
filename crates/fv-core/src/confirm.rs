/// A yes/no prompt shown before a destructive or significant action.
///
/// The browser answers with `window.confirm`, the CLI with a terminal prompt
/// or `--yes`.
pub trait Confirm {
    fn confirm(&mut self, prompt: &str) -> bool;
}

impl<F> Confirm for F
where
    F: FnMut(&str) -> bool,
{
    fn confirm(&mut self, prompt: &str) -> bool {
        self(prompt)
    }
}

/// Answers every prompt the same way.
#[derive(Debug, Clone, Copy)]
pub struct Always(pub bool);

impl Confirm for Always {
    fn confirm(&mut self, _prompt: &str) -> bool {
        self.0
    }
}
