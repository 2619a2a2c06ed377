//! desk-runner: headless duty desk for consultation assignment.
//!
//! Usage:
//!   desk-runner --roster data/employees.json --db desk.db
//!   desk-runner --roster data/employees.json --ipc-mode

use anyhow::Result;
use chrono::{Local, NaiveDateTime};
use konsil_core::{
    attendance::{Attendance, ShiftPeriod},
    config::DeskConfig,
    desk::DutyDesk,
    event::AssignmentRecord,
    queue::Candidate,
    roster::{MoodStatus, Roster},
    store::DeskStore,
};
use std::env;
use std::io::{self, BufRead, Write};

#[derive(serde::Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
enum IpcCommand {
    GetState,
    Assign,
    Skip,
    Reset,
    SetMood {
        staff_id: String,
        mood: String,
    },
    SetUmbrella {
        staff_id: String,
        value: bool,
    },
    SetAvailable {
        staff_id: String,
        value: bool,
    },
    SetAttendance {
        staff_id: String,
        morning: bool,
        afternoon: bool,
    },
    Quit,
}

#[derive(serde::Serialize)]
struct CandidateView {
    id: String,
    name: String,
    score: f64,
    mood: String,
    umbrella_friend: bool,
}

impl From<&Candidate> for CandidateView {
    fn from(c: &Candidate) -> Self {
        Self {
            id: c.record.id.clone(),
            name: c.record.display_name.clone(),
            score: c.score,
            mood: format!("{} {}", c.record.mood_status.icon(), c.record.mood_status.label()),
            umbrella_friend: c.record.umbrella_friend,
        }
    }
}

#[derive(serde::Serialize)]
struct UiState {
    session_id: String,
    now: NaiveDateTime,
    period: ShiftPeriod,
    suggestion: Option<CandidateView>,
    last_shown: Option<CandidateView>,
    priority_list: Vec<CandidateView>,
    committed: Vec<String>,
    previewed: Vec<String>,
    assignments: Vec<AssignmentRecord>,
    message: Option<String>,
}

/// Everything the operator works on during one run.
struct Session {
    desk: DutyDesk,
    roster: Roster,
    roster_path: Option<String>,
    attendance: Attendance,
    last_shown: Option<Candidate>,
}

fn main() -> Result<()> {
    env_logger::init();

    let args: Vec<String> = env::args().collect();
    let ipc_mode = args.iter().any(|a| a == "--ipc-mode");
    let data_dir = string_arg(&args, "--data-dir").unwrap_or("./data");
    let db = string_arg(&args, "--db").unwrap_or(":memory:");
    let roster_arg = string_arg(&args, "--roster").map(str::to_string);

    let config = DeskConfig::load_or_default(data_dir)?;
    let roster_path = roster_arg.unwrap_or_else(|| format!("{data_dir}/employees.json"));

    let (roster, roster_path) = if std::path::Path::new(&roster_path).exists() {
        (Roster::load(&roster_path, &config.roster)?, Some(roster_path))
    } else {
        log::warn!("{roster_path} not found, starting in demo mode");
        (Roster::demo(), None)
    };

    let store = DeskStore::open(db)?;
    store.migrate()?;

    let opened_at = Local::now().naive_local();
    let session_id = format!("desk-{}", opened_at.format("%Y%m%d-%H%M%S"));

    if !ipc_mode {
        println!("Konsil desk — desk-runner");
        println!("  session:   {session_id}");
        println!("  roster:    {} ({} staff)", roster_path.as_deref().unwrap_or("demo"), roster.len());
        println!("  db:        {db}");
        println!();
    }

    let desk = DutyDesk::open(session_id, config, store, &roster, opened_at)?;
    let mut session = Session {
        desk,
        attendance: Attendance::from_roster(&roster),
        roster,
        roster_path,
        last_shown: None,
    };

    if ipc_mode {
        run_ipc_loop(&mut session)?;
    } else {
        print_summary(&session)?;
    }
    Ok(())
}

fn run_ipc_loop(session: &mut Session) -> Result<()> {
    let stdin = io::stdin();
    let mut stdout = io::stdout();
    let mut handle = stdin.lock();
    let mut buffer = String::new();

    loop {
        buffer.clear();
        let bytes_read = handle.read_line(&mut buffer)?;
        if bytes_read == 0 {
            break; // EOF
        }
        if buffer.trim().is_empty() {
            continue;
        }

        let cmd: IpcCommand = match serde_json::from_str(&buffer) {
            Ok(c) => c,
            Err(e) => {
                let err_json = serde_json::json!({ "error": e.to_string() });
                writeln!(stdout, "{}", err_json)?;
                stdout.flush()?;
                continue;
            }
        };

        if matches!(cmd, IpcCommand::Quit) {
            break;
        }
        let message = match handle_command(session, cmd) {
            Ok(m) => m,
            Err(e) => {
                log::warn!("command failed: {e:#}");
                Some(format!("error: {e}"))
            }
        };
        let state = build_ui_state(session, message)?;
        writeln!(stdout, "{}", serde_json::to_string(&state)?)?;
        stdout.flush()?;
    }
    Ok(())
}

fn handle_command(session: &mut Session, cmd: IpcCommand) -> Result<Option<String>> {
    let now = Local::now().naive_local();
    let message = match cmd {
        IpcCommand::GetState | IpcCommand::Quit => None,
        IpcCommand::Assign => {
            session.last_shown = None;
            match session.desk.assign(&session.roster, Some(&session.attendance), now)? {
                Some(rec) => Some(format!("assigned to {} ({})", rec.staff_id, rec.display_name)),
                None => Some("no one available".to_string()),
            }
        }
        IpcCommand::Skip => {
            let shown = session.desk.skip(&session.roster, Some(&session.attendance))?;
            let message = match &shown {
                Some(c) => Some(format!("next option: {}", c.record.id)),
                None => Some("no one available".to_string()),
            };
            session.last_shown = shown;
            message
        }
        IpcCommand::Reset => {
            session.last_shown = None;
            session.desk.reset()?;
            Some("rotation reset".to_string())
        }
        IpcCommand::SetMood { staff_id, mood } => {
            let mood = MoodStatus::from_label(&mood)
                .ok_or_else(|| anyhow::anyhow!("unknown mood '{mood}'"))?;
            session.roster.set_mood(&staff_id, mood)?;
            save_roster(session)?;
            Some(format!("{staff_id} is now {}", mood.label()))
        }
        IpcCommand::SetUmbrella { staff_id, value } => {
            session.roster.set_umbrella_friend(&staff_id, value)?;
            save_roster(session)?;
            None
        }
        IpcCommand::SetAvailable { staff_id, value } => {
            session.roster.set_available(&staff_id, value)?;
            session.attendance.set(&staff_id, value, value);
            save_roster(session)?;
            None
        }
        IpcCommand::SetAttendance { staff_id, morning, afternoon } => {
            if session.roster.get(&staff_id).is_none() {
                anyhow::bail!("unknown staff '{staff_id}'");
            }
            session.attendance.set(&staff_id, morning, afternoon);
            None
        }
    };
    Ok(message)
}

/// Status edits are written straight back, like the staff view did.
fn save_roster(session: &Session) -> Result<()> {
    if let Some(path) = &session.roster_path {
        session.roster.save(path)?;
        log::debug!("roster saved to {path}");
    }
    Ok(())
}

fn build_ui_state(session: &Session, message: Option<String>) -> Result<UiState> {
    let now = Local::now().naive_local();
    let att = Some(&session.attendance);
    let suggestion = session.desk.suggest(&session.roster, att);
    let priority_list = session.desk.priority_list(&session.roster, att);
    let state = session.desk.state();

    Ok(UiState {
        session_id: session.desk.session_id.clone(),
        now,
        period: ShiftPeriod::at(&now),
        suggestion: suggestion.as_ref().map(CandidateView::from),
        last_shown: session.last_shown.as_ref().map(CandidateView::from),
        priority_list: priority_list.iter().map(CandidateView::from).collect(),
        committed: state.committed_ids().to_vec(),
        previewed: state.preview_ids().to_vec(),
        assignments: session.desk.assignment_log()?,
        message,
    })
}

fn print_summary(session: &Session) -> Result<()> {
    let att = Some(&session.attendance);
    let ranked = session.desk.candidates(&session.roster, att);

    println!("=== PRIORITY LIST ===");
    if ranked.is_empty() {
        println!("  (no one available)");
    }
    for (idx, c) in ranked.iter().take(session.desk.config.priority_list_len).enumerate() {
        println!(
            "  {:>2}. {:<6} {:<20} {} {:>5.0}%{}",
            idx + 1,
            c.record.id,
            c.record.display_name,
            c.record.mood_status.icon(),
            c.score * 100.0,
            if c.record.umbrella_friend { "  ☂" } else { "" }
        );
    }

    let flagged: Vec<_> = session
        .roster
        .iter()
        .filter(|r| !r.is_well_formed())
        .map(|r| r.id.as_str())
        .collect();
    if !flagged.is_empty() {
        println!();
        println!("  unscored (bad data): {}", flagged.join(", "));
    }

    println!();
    match session.desk.suggest(&session.roster, att) {
        Some(c) => println!("Next: {} ({})", c.record.id, c.record.display_name),
        None => println!("Next: —"),
    }
    Ok(())
}

fn string_arg<'a>(args: &'a [String], flag: &str) -> Option<&'a str> {
    args.windows(2)
        .find(|w| w[0] == flag)
        .map(|w| w[1].as_str())
}
