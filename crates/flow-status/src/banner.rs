//! Default success and error banners.

use colored::Colorize;

use crate::console::Console;

const SUCCESS_RULE: &str = "-----------------------------";
const SUCCESS_MESSAGE: &str = "Everything is fine with Flow!";
const ERROR_RULE: &str = "----------------";
const ERROR_MESSAGE: &str = "Flow has errors!";

/// Prints the banner shown when the checker reports no errors.
pub fn success<C>(console: &C)
where
    C: Console + ?Sized,
{
    console.log(&format!("\n{SUCCESS_RULE}").green().to_string());
    console.log(SUCCESS_MESSAGE);
    console.log(&format!("{SUCCESS_RULE}\n").green().to_string());
}

/// Prints the banner shown when the checker reports errors.
pub fn failure<C>(console: &C)
where
    C: Console + ?Sized,
{
    console.log(&format!("\n{ERROR_RULE}").red().to_string());
    console.log(ERROR_MESSAGE);
    console.log(&format!("{ERROR_RULE}\n").red().to_string());
}
