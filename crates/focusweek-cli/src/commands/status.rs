use focusweek_core::{Config, SessionView};
use serde::Serialize;

use super::task::{week_summary, DaySummary};
use super::{open_session, print_json, CliResult};

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct Overview<'a> {
    #[serde(flatten)]
    session: SessionView,
    week: Vec<DaySummary<'a>>,
}

pub fn run(config: &Config) -> CliResult {
    let session = open_session(config)?;
    print_json(&Overview {
        session: session.view(),
        week: week_summary(&session),
    })
}
