use std::fmt::Display;

use chrono::NaiveDate;
use clap::Args;
use fv_api_types::ApiLead;
use fv_core::filter::LeadFilter;
use fv_core::form::{create_lead, CreateLeadError, LeadForm};
use fv_core::panel::{DetailPanel, PanelError};
use fv_core::pipeline::PipelineBoard;
use fv_core::store::fetch_all;
use fv_core::transition::TransitionError;
use fv_core::types::{BatchType, CourseCategory, LeadSource, Stage};

use super::{friendly_error, Context, TerminalConfirm};

// ---------------------------------------------------------------------------
// Argument parsing
// ---------------------------------------------------------------------------

fn normalize(value: &str) -> String {
    value.chars().filter(|c| c.is_ascii_alphanumeric()).collect::<String>().to_ascii_lowercase()
}

/// Match a label ignoring case, spaces and punctuation, so `free-batch`
/// finds "Free Batch".
fn parse_label<T: Copy + Display>(all: &[T], value: &str) -> Result<T, String> {
    let wanted = normalize(value);
    all.iter()
        .copied()
        .find(|v| normalize(&v.to_string()) == wanted)
        .ok_or_else(|| {
            let options: Vec<String> = all.iter().map(|v| v.to_string()).collect();
            format!("expected one of: {}", options.join(", "))
        })
}

pub fn parse_stage(value: &str) -> Result<Stage, String> {
    parse_label(&Stage::ALL, value)
}

pub fn parse_source(value: &str) -> Result<LeadSource, String> {
    parse_label(LeadSource::ALL, value)
}

pub fn parse_course(value: &str) -> Result<CourseCategory, String> {
    parse_label(CourseCategory::ALL, value)
}

pub fn parse_batch(value: &str) -> Result<BatchType, String> {
    parse_label(BatchType::ALL, value)
}

pub fn parse_date(value: &str) -> Result<NaiveDate, String> {
    NaiveDate::parse_from_str(value, "%Y-%m-%d").map_err(|_| "expected YYYY-MM-DD".to_string())
}

#[derive(Debug, Clone, Default, Args)]
pub struct FilterArgs {
    /// Case-insensitive match on name, mobile, email or city.
    #[arg(short, long, default_value = "")]
    pub search: String,
    #[arg(long, value_parser = parse_stage)]
    pub stage: Option<Stage>,
    #[arg(long, value_parser = parse_source)]
    pub source: Option<LeadSource>,
    #[arg(long = "batch", value_parser = parse_batch)]
    pub batch_type: Option<BatchType>,
    /// Only leads with a follow-up on this day (YYYY-MM-DD).
    #[arg(long = "follow-up", value_parser = parse_date)]
    pub follow_up_on: Option<NaiveDate>,
}

impl From<&FilterArgs> for LeadFilter {
    fn from(args: &FilterArgs) -> Self {
        LeadFilter {
            search: args.search.clone(),
            stage: args.stage,
            source: args.source,
            batch_type: args.batch_type,
            follow_up_on: args.follow_up_on,
        }
    }
}

/// Lead fields for `add` and `edit`. On `edit`, only the flags given change.
#[derive(Debug, Clone, Default, Args)]
pub struct LeadFields {
    #[arg(long)]
    pub name: Option<String>,
    #[arg(long)]
    pub mobile: Option<String>,
    #[arg(long)]
    pub email: Option<String>,
    #[arg(long)]
    pub age: Option<String>,
    #[arg(long)]
    pub education: Option<String>,
    #[arg(long)]
    pub city: Option<String>,
    #[arg(long)]
    pub occupation: Option<String>,
    #[arg(long, value_parser = parse_source)]
    pub source: Option<LeadSource>,
    #[arg(long, value_parser = parse_course)]
    pub course: Option<CourseCategory>,
    #[arg(long)]
    pub batch_section: Option<String>,
    #[arg(long = "batch", value_parser = parse_batch)]
    pub batch_type: Option<BatchType>,
    /// Follow-up date (YYYY-MM-DD).
    #[arg(long = "follow-up")]
    pub follow_up: Option<String>,
}

impl LeadFields {
    fn apply(self, form: &mut LeadForm) {
        let text_fields = [
            (self.name, &mut form.full_name),
            (self.mobile, &mut form.mobile),
            (self.email, &mut form.email),
            (self.age, &mut form.age),
            (self.education, &mut form.education),
            (self.city, &mut form.city),
            (self.occupation, &mut form.occupation),
            (self.batch_section, &mut form.batch_section),
            (self.follow_up, &mut form.follow_up_date),
        ];
        for (value, slot) in text_fields {
            if let Some(v) = value {
                *slot = v;
            }
        }
        if let Some(v) = self.source {
            form.set_lead_source(v);
        }
        if let Some(v) = self.course {
            form.set_course_category(v);
        }
        if let Some(v) = self.batch_type {
            form.set_batch_type(v);
        }
    }
}

fn panel_error(err: PanelError) -> anyhow::Error {
    match err {
        PanelError::Api(e) => friendly_error(e),
        PanelError::Transition(TransitionError::Update(e)) => friendly_error(e),
        PanelError::Transition(TransitionError::Refresh(e)) => {
            anyhow::anyhow!("The change was saved but the list could not be refreshed: {}", friendly_error(e))
        }
        other => other.into(),
    }
}

// ---------------------------------------------------------------------------
// Rendering
// ---------------------------------------------------------------------------

fn follow_up(lead: &ApiLead) -> &str {
    lead.follow_up_date.as_deref().and_then(|d| d.get(..10)).unwrap_or("-")
}

pub fn render_table(leads: &[&ApiLead]) -> String {
    let mut out = format!(
        "{:<26} {:<24} {:<12} {:<16} {:<10} {:<6} {}\n",
        "ID", "NAME", "MOBILE", "STAGE", "SOURCE", "BATCH", "FOLLOW-UP"
    );
    for lead in leads {
        out.push_str(&format!(
            "{:<26} {:<24} {:<12} {:<16} {:<10} {:<6} {}\n",
            lead.id,
            lead.full_name,
            lead.mobile,
            lead.stage,
            lead.lead_source,
            lead.batch_type,
            follow_up(lead)
        ));
    }
    out.push_str(&format!("{} lead(s)\n", leads.len()));
    out
}

pub fn render_board(board: &PipelineBoard) -> String {
    let mut out = String::new();
    for lane in board.lanes() {
        out.push_str(&lane.header());
        out.push('\n');
        for lead in &lane.leads {
            out.push_str(&format!("  - {} ({}) [{}]\n", lead.full_name, lead.mobile, lead.id));
        }
    }
    if board.unplaced() > 0 {
        out.push_str(&format!("{} lead(s) with an unrecognised stage are not shown\n", board.unplaced()));
    }
    out
}

pub fn render_detail(lead: &ApiLead) -> String {
    let opt = |v: &Option<String>| v.clone().unwrap_or_else(|| "-".to_string());
    let mut out = format!("{} [{}]\n", lead.full_name, lead.id);
    out.push_str(&format!("  stage:      {}\n", lead.stage));
    out.push_str(&format!("  mobile:     {}\n", lead.mobile));
    out.push_str(&format!("  email:      {}\n", opt(&lead.email)));
    out.push_str(&format!("  city:       {}\n", opt(&lead.city)));
    out.push_str(&format!("  source:     {}\n", lead.lead_source));
    out.push_str(&format!("  course:     {}\n", lead.course_category));
    out.push_str(&format!("  batch:      {} {}\n", lead.batch_type, lead.batch_section));
    out.push_str(&format!("  follow-up:  {}\n", follow_up(lead)));
    out.push_str(&format!("  remarks:    {}\n", lead.remarks.len()));
    for remark in &lead.remarks {
        let when = remark
            .timestamp
            .map(|t| t.format("%Y-%m-%d %H:%M").to_string())
            .unwrap_or_default();
        out.push_str(&format!("    [{when}] {}: {}\n", remark.author, remark.text));
    }
    out
}

// ---------------------------------------------------------------------------
// Commands
// ---------------------------------------------------------------------------

async fn load(ctx: &Context) -> anyhow::Result<(fv_client::ApiClient, Vec<ApiLead>)> {
    let client = ctx.api_client()?;
    let leads = fetch_all(&client).await.map_err(friendly_error)?;
    Ok((client, leads))
}

fn find(leads: Vec<ApiLead>, id: &str) -> anyhow::Result<ApiLead> {
    leads
        .into_iter()
        .find(|l| l.id == id)
        .ok_or_else(|| anyhow::anyhow!("No lead with id {id}"))
}

pub async fn list(ctx: &Context, filter: &FilterArgs) -> anyhow::Result<()> {
    let (_, leads) = load(ctx).await?;
    let filter = LeadFilter::from(filter);
    print!("{}", render_table(&filter.apply(&leads)));
    Ok(())
}

pub async fn board(ctx: &Context, filter: &FilterArgs) -> anyhow::Result<()> {
    let (_, leads) = load(ctx).await?;
    let filter = LeadFilter::from(filter);
    print!("{}", render_board(&PipelineBoard::from_leads(filter.apply(&leads))));
    Ok(())
}

pub async fn show(ctx: &Context, id: &str) -> anyhow::Result<()> {
    let (_, leads) = load(ctx).await?;
    print!("{}", render_detail(&find(leads, id)?));
    Ok(())
}

/// Create a lead. `stage` defaults to Enquiry.
pub async fn add(ctx: &Context, fields: LeadFields, stage: Option<Stage>) -> anyhow::Result<ApiLead> {
    let client = ctx.api_client()?;
    let mut form = LeadForm::default();
    fields.apply(&mut form);
    if let Some(stage) = stage {
        form.stage = stage;
    }

    let (created, leads) = create_lead(&client, &form).await.map_err(|e| match e {
        CreateLeadError::Create(api) => friendly_error(api),
        other => other.into(),
    })?;

    let board = PipelineBoard::from_leads(&leads);
    let stage = board.stage_of(&created.id).unwrap_or(form.stage);
    println!("Lead created: {}", created.id);
    println!("  name:  {}", created.full_name);
    println!("  stage: {} ({} lead(s) in lane)", stage, board.count(stage));
    Ok(created)
}

pub async fn edit(ctx: &Context, id: &str, fields: LeadFields) -> anyhow::Result<()> {
    let (client, leads) = load(ctx).await?;
    let mut panel = DetailPanel::open(find(leads, id)?);
    panel.toggle_edit();
    if let Some(draft) = panel.draft_mut() {
        fields.apply(draft);
    }
    panel.save(&client).await.map_err(panel_error)?;
    println!("Lead {} updated.", panel.lead().id);
    Ok(())
}

/// Move a lead to another stage after confirmation.
pub async fn move_stage(ctx: &Context, id: &str, to: Stage, yes: bool) -> anyhow::Result<()> {
    let (client, leads) = load(ctx).await?;
    let mut panel = DetailPanel::open(find(leads, id)?);
    let from = panel.lead().stage.clone();
    let mut confirm = TerminalConfirm { assume_yes: yes };

    match panel.change_stage(&client, to, &mut confirm).await.map_err(panel_error)? {
        Some(_) => println!("Moved {}: {} -> {}", panel.lead().full_name, from, panel.lead().stage),
        None if from == to.as_str() => println!("{} is already in {}.", panel.lead().full_name, to),
        None => println!("Cancelled."),
    }
    Ok(())
}

pub async fn remark(ctx: &Context, id: &str, text: &str) -> anyhow::Result<()> {
    let (client, leads) = load(ctx).await?;
    let author = ctx.author_name()?;
    let mut panel = DetailPanel::open(find(leads, id)?);
    panel.set_remark_input(text);
    panel.add_remark(&client, &author).await.map_err(panel_error)?;
    println!("Remark added ({} total).", panel.lead().remarks.len());
    Ok(())
}
