//! Interactive questions for options not given on the command line.
//! Every prompt re-asks until the answer parses.

use dialoguer::{Confirm, Input, theme::ColorfulTheme};
use eyre::Result;

use crate::retry::RetryPolicy;
use crate::selection::{ProcessMode, ScheduleMode, TxKind, TxSelection};

fn ask<T, E, F>(prompt: &str, parse: F) -> Result<T>
where
    F: Fn(&str) -> std::result::Result<T, E>,
    E: std::fmt::Display,
{
    let theme = ColorfulTheme::default();
    let answer: String = Input::with_theme(&theme)
        .with_prompt(prompt)
        .validate_with(|input: &String| parse(input).map(|_| ()).map_err(|e| e.to_string()))
        .interact_text()?;
    parse(&answer).map_err(|e| eyre::eyre!("{e}"))
}

pub fn use_proxy() -> Result<bool> {
    Ok(Confirm::with_theme(&ColorfulTheme::default())
        .with_prompt("Do you want to use proxies? Proxies are only used for task claims, not for TX")
        .default(false)
        .interact()?)
}

pub fn process_mode() -> Result<ProcessMode> {
    ask(
        &format!("Process option:\n{}\nEnter your choice (1/2/3)", ProcessMode::MENU),
        ProcessMode::from_answer,
    )
}

pub fn transactions() -> Result<TxSelection> {
    ask(
        &format!(
            "What TX do you want to process?:\n{}\nEnter your choices (e.g. 1 or 1,3,5, or 'all')",
            TxKind::menu()
        ),
        TxSelection::parse,
    )
}

pub fn schedule_mode() -> Result<ScheduleMode> {
    ask(
        &format!("Scheduling:\n{}\nEnter your choice (1/2)", ScheduleMode::MENU),
        ScheduleMode::from_answer,
    )
}

pub fn retry_policy() -> Result<RetryPolicy> {
    let answer: String = Input::with_theme(&ColorfulTheme::default())
        .with_prompt("Enter the number of retries for TX errors (0 for infinite retries, 'none' for no retries)")
        .default("none".to_string())
        .interact_text()?;
    Ok(RetryPolicy::from_answer(&answer))
}
