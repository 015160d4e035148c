use blexp::{Blexp, Error, Expense, ExpenseTemplate, SubmittedExpense};
use serde::Serialize;

use super::CommandExecutor;
use crate::display::Displayable;

/// Top level cli sub-commands.
#[derive(Debug, Clone, clap::Subcommand)]
pub enum Command {
    /// List the expense templates, flagging the primary one
    #[command(visible_aliases = ["l"])]
    List,
    /// Submit expenses built from templates
    /// {n}Without --force, the expenses are only prepared and displayed.
    #[command(visible_aliases = ["s"])]
    Submit {
        /// The names of the templates to submit, in order.
        /// Defaults to the primary template
        names: Vec<String>,
        /// Really send the expenses to Expensify
        #[arg(short, long)]
        force: bool,
    },
}

#[derive(Debug, Clone, Serialize)]
pub struct TemplateListing {
    pub name: String,
    pub primary: bool,
    pub template: ExpenseTemplate,
}

#[derive(Debug, Clone, Serialize)]
pub struct SubmissionReport {
    pub template: String,
    pub submitted: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub expense: Option<Expense>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub confirmation: Option<SubmittedExpense>,
}

fn list(blexp: &Blexp) -> Vec<TemplateListing> {
    blexp
        .templates()
        .iter()
        .map(|(name, template)| TemplateListing {
            name: name.clone(),
            primary: blexp.primary() == Some(name.as_str()),
            template: template.clone(),
        })
        .collect()
}

/// The template whose submission aborted the remaining ones
#[derive(Debug)]
struct Aborted {
    template: String,
    error: Error,
}

/// Submit, or simulate the submission of, each template of `names` in turn,
/// pushing a report for each success.
/// The first failure aborts the remaining ones.
fn submit_each(
    blexp: &Blexp,
    names: Vec<String>,
    force: bool,
    reports: &mut Vec<SubmissionReport>,
) -> Result<(), Aborted> {
    for name in names {
        let report = if force {
            match blexp.submit_named(&name) {
                Ok(confirmation) => {
                    log::info!(
                        "Submitted template={name} transaction_id={}",
                        confirmation.transaction_id
                    );
                    SubmissionReport {
                        template: name,
                        submitted: true,
                        expense: None,
                        confirmation: Some(confirmation),
                    }
                }
                Err(error) => {
                    return Err(Aborted {
                        template: name,
                        error,
                    })
                }
            }
        } else {
            match blexp.prepare(&name) {
                Ok(expense) => {
                    log::warn!(
                        "Not submitted (use --force) template={name} exp={}",
                        serde_json::json!(expense)
                    );
                    SubmissionReport {
                        template: name,
                        submitted: false,
                        expense: Some(expense),
                        confirmation: None,
                    }
                }
                Err(error) => {
                    return Err(Aborted {
                        template: name,
                        error,
                    })
                }
            }
        };
        reports.push(report);
    }
    Ok(())
}

/// Submit the templates of `names`, or the primary one if `names` is empty.
///
/// On failure, the reports of the templates already handled are printed before
/// the error is returned.
fn submit(blexp: &Blexp, names: Vec<String>, force: bool) -> blexp::Result<Vec<SubmissionReport>> {
    let names = if names.is_empty() {
        vec![blexp.primary().ok_or(Error::NoPrimaryTemplate)?.to_owned()]
    } else {
        names
    };

    let mut reports = Vec::with_capacity(names.len());
    if let Err(Aborted { template, error }) = submit_each(blexp, names, force, &mut reports) {
        log::error!(
            "Failed on template={template}, {} template(s) handled before",
            reports.len()
        );
        if !reports.is_empty() {
            reports.display();
        }
        return Err(error);
    }
    Ok(reports)
}

impl CommandExecutor for Command {
    fn execute(self, blexp: Blexp) -> blexp::Result<Box<dyn Displayable>> {
        let res: Box<dyn Displayable> = match self {
            Command::List => Box::new(list(&blexp)),
            Command::Submit { names, force } => Box::new(submit(&blexp, names, force)?),
        };
        Ok(res)
    }
}
