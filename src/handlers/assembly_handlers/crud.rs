use actix_web::{web, HttpResponse};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::auth::{require_role, AuthContext, ADMIN_ROLES};
use crate::db::Tenants;
use crate::errors::AppError;
use crate::models::assembly::{
    self, assembly_end_time, AgendaItem, Assembly, AssemblyStatus, AssemblyType,
};
use crate::validate;

use super::lifecycle;

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AgendaItemRequest {
    pub numeral: i32,
    pub topic: String,
    #[serde(default)]
    pub notes: String,
    /// `HH:MM:SS`, defaults to zero duration.
    pub duration: Option<String>,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateAssemblyRequest {
    pub title: String,
    #[serde(default)]
    pub description: String,
    pub assembly_type: String,
    pub scheduled_at: DateTime<Utc>,
    #[serde(default)]
    pub location: String,
    #[serde(default)]
    pub agenda: Vec<AgendaItemRequest>,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AssemblyDetail {
    #[serde(flatten)]
    pub assembly: Assembly,
    pub agenda: Vec<AgendaItem>,
}

fn validate_agenda(items: &[AgendaItemRequest]) -> Result<Vec<(i32, String, String, i32)>, AppError> {
    let mut agenda = Vec::with_capacity(items.len());
    for item in items {
        if let Some(msg) = validate::validate_numeral(item.numeral) {
            return Err(AppError::Validation(msg));
        }
        if let Some(msg) = validate::validate_required(&item.topic, "Agenda topic", 300) {
            return Err(AppError::Validation(msg));
        }
        if let Some(msg) = validate::validate_optional(&item.notes, "Agenda notes", 5000) {
            return Err(AppError::Validation(msg));
        }
        let duration_seconds = match &item.duration {
            Some(raw) => validate::parse_duration_hms(raw).ok_or_else(|| {
                AppError::Validation(format!(
                    "Agenda item {} duration must be HH:MM:SS",
                    item.numeral
                ))
            })?,
            None => 0,
        };
        agenda.push((
            item.numeral,
            item.topic.trim().to_string(),
            item.notes.trim().to_string(),
            duration_seconds,
        ));
    }
    Ok(agenda)
}

/// POST /assemblies — create a planned assembly with its agenda.
pub async fn create(
    tenants: web::Data<Tenants>,
    ctx: AuthContext,
    body: web::Json<CreateAssemblyRequest>,
) -> Result<HttpResponse, AppError> {
    require_role(&ctx, ADMIN_ROLES)?;

    if let Some(msg) = validate::validate_required(&body.title, "Title", 200) {
        return Err(AppError::Validation(msg));
    }
    if let Some(msg) = validate::validate_optional(&body.description, "Description", 5000) {
        return Err(AppError::Validation(msg));
    }
    if let Some(msg) = validate::validate_optional(&body.location, "Location", 300) {
        return Err(AppError::Validation(msg));
    }
    let assembly_type = AssemblyType::parse(&body.assembly_type).ok_or_else(|| {
        AppError::Validation("Assembly type must be 'ordinary' or 'extraordinary'".to_string())
    })?;
    let agenda = validate_agenda(&body.agenda)?;

    let db = tenants.handle(&ctx.tenant_schema)?;
    let mut tx = db.begin().await?;
    let assembly_id = assembly::create(
        &mut tx,
        ctx.complex_id,
        body.title.trim(),
        body.description.trim(),
        assembly_type,
        body.scheduled_at,
        body.location.trim(),
        &agenda,
    )
    .await?;
    let created = assembly::find_by_id(&mut tx, assembly_id)
        .await?
        .ok_or_else(|| AppError::NotFound("Assembly".to_string()))?;
    let agenda = assembly::find_agenda(&mut tx, assembly_id).await?;
    tx.commit().await?;

    let details = serde_json::json!({
        "title": created.title,
        "scheduledAt": created.scheduled_at,
        "agendaItems": agenda.len(),
    });
    let _ = crate::audit::log(&db, ctx.user_id, "assembly.created", "assembly", assembly_id, details)
        .await;

    Ok(HttpResponse::Created().json(AssemblyDetail {
        assembly: created,
        agenda,
    }))
}

#[derive(Deserialize)]
pub struct ListQuery {
    /// "upcoming" (default) or "past".
    pub when: Option<String>,
}

/// GET /assemblies?when=upcoming|past
pub async fn list(
    tenants: web::Data<Tenants>,
    ctx: AuthContext,
    query: web::Query<ListQuery>,
) -> Result<HttpResponse, AppError> {
    let db = tenants.handle(&ctx.tenant_schema)?;
    let mut tx = db.begin().await?;
    let now = Utc::now();
    let items = match query.when.as_deref() {
        None | Some("upcoming") => assembly::find_upcoming(&mut tx, now).await?,
        Some("past") => assembly::find_past(&mut tx, now).await?,
        Some(other) => {
            return Err(AppError::Validation(format!(
                "Unknown list filter '{other}', expected 'upcoming' or 'past'"
            )))
        }
    };
    tx.commit().await?;
    Ok(HttpResponse::Ok().json(items))
}

/// GET /assemblies/{id}
pub async fn read(
    tenants: web::Data<Tenants>,
    ctx: AuthContext,
    path: web::Path<i64>,
) -> Result<HttpResponse, AppError> {
    let assembly_id = path.into_inner();
    let db = tenants.handle(&ctx.tenant_schema)?;
    let mut tx = db.begin().await?;
    let found = assembly::find_by_id(&mut tx, assembly_id)
        .await?
        .ok_or_else(|| AppError::NotFound("Assembly".to_string()))?;
    let agenda = assembly::find_agenda(&mut tx, assembly_id).await?;
    tx.commit().await?;
    Ok(HttpResponse::Ok().json(AssemblyDetail {
        assembly: found,
        agenda,
    }))
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AgendaNotesUpdate {
    pub numeral: i32,
    pub notes: String,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateAssemblyRequest {
    pub title: Option<String>,
    pub description: Option<String>,
    pub scheduled_at: Option<DateTime<Utc>>,
    pub location: Option<String>,
    /// Requesting a lifecycle transition; other fields may accompany it.
    pub status: Option<String>,
    /// Item notes stay editable after the agenda freezes.
    #[serde(default)]
    pub agenda_notes: Vec<AgendaNotesUpdate>,
}

/// PUT /assemblies/{id} — update header fields, agenda notes, and/or
/// request a status transition.
pub async fn update(
    tenants: web::Data<Tenants>,
    ctx: AuthContext,
    path: web::Path<i64>,
    body: web::Json<UpdateAssemblyRequest>,
) -> Result<HttpResponse, AppError> {
    require_role(&ctx, ADMIN_ROLES)?;

    let assembly_id = path.into_inner();
    let target_status = body
        .status
        .as_deref()
        .map(|raw| {
            AssemblyStatus::parse(raw)
                .ok_or_else(|| AppError::Validation(format!("Unknown status '{raw}'")))
        })
        .transpose()?;

    let db = tenants.handle(&ctx.tenant_schema)?;
    let mut tx = db.begin().await?;
    let current = assembly::find_by_id(&mut tx, assembly_id)
        .await?
        .ok_or_else(|| AppError::NotFound("Assembly".to_string()))?;

    let has_field_update = body.title.is_some()
        || body.description.is_some()
        || body.scheduled_at.is_some()
        || body.location.is_some();

    if has_field_update {
        if current.status != AssemblyStatus::Planned {
            return Err(AppError::Conflict(format!(
                "Assembly fields are frozen once the assembly is {}",
                current.status.as_str()
            )));
        }
        let title = body.title.as_deref().unwrap_or(&current.title);
        let description = body.description.as_deref().unwrap_or(&current.description);
        let scheduled_at = body.scheduled_at.unwrap_or(current.scheduled_at);
        let location = body.location.as_deref().unwrap_or(&current.location);
        if let Some(msg) = validate::validate_required(title, "Title", 200) {
            return Err(AppError::Validation(msg));
        }
        if !assembly::update_fields(&mut tx, assembly_id, title.trim(), description, scheduled_at, location)
            .await?
        {
            return Err(AppError::Conflict(
                "Assembly is no longer planned".to_string(),
            ));
        }
    }

    for note in &body.agenda_notes {
        if let Some(msg) = validate::validate_optional(&note.notes, "Agenda notes", 5000) {
            return Err(AppError::Validation(msg));
        }
        if !assembly::update_agenda_notes(&mut tx, assembly_id, note.numeral, note.notes.trim())
            .await?
        {
            return Err(AppError::Conflict(format!(
                "Agenda item {} cannot be annotated (missing, or assembly is closed)",
                note.numeral
            )));
        }
    }

    if let Some(to) = target_status {
        lifecycle::apply_transition(&db, &mut tx, &ctx, &current, to).await?;
    }

    let updated = assembly::find_by_id(&mut tx, assembly_id)
        .await?
        .ok_or_else(|| AppError::NotFound("Assembly".to_string()))?;
    let agenda = assembly::find_agenda(&mut tx, assembly_id).await?;
    tx.commit().await?;

    if let Some(to) = target_status {
        let details = serde_json::json!({
            "from": current.status.as_str(),
            "to": to.as_str(),
        });
        let _ = crate::audit::log(
            &db,
            ctx.user_id,
            "assembly.transition",
            "assembly",
            assembly_id,
            details,
        )
        .await;
    } else {
        let _ = crate::audit::log(
            &db,
            ctx.user_id,
            "assembly.updated",
            "assembly",
            assembly_id,
            serde_json::json!({}),
        )
        .await;
    }

    Ok(HttpResponse::Ok().json(AssemblyDetail {
        assembly: updated,
        agenda,
    }))
}

/// DELETE /assemblies/{id} — hard delete, only while planned and only
/// before the assembly's computed end time.
pub async fn delete(
    tenants: web::Data<Tenants>,
    ctx: AuthContext,
    path: web::Path<i64>,
) -> Result<HttpResponse, AppError> {
    require_role(&ctx, ADMIN_ROLES)?;

    let assembly_id = path.into_inner();
    let db = tenants.handle(&ctx.tenant_schema)?;
    let mut tx = db.begin().await?;
    let current = assembly::find_by_id(&mut tx, assembly_id)
        .await?
        .ok_or_else(|| AppError::NotFound("Assembly".to_string()))?;

    if current.status != AssemblyStatus::Planned {
        return Err(AppError::Conflict(format!(
            "Cannot delete an assembly that is {}",
            current.status.as_str()
        )));
    }

    let agenda = assembly::find_agenda(&mut tx, assembly_id).await?;
    if assembly_end_time(current.scheduled_at, &agenda) < Utc::now() {
        return Err(AppError::Conflict(
            "Assembly has concluded and can no longer be deleted".to_string(),
        ));
    }

    if !assembly::delete_planned(&mut tx, assembly_id).await? {
        return Err(AppError::Conflict(
            "Assembly is no longer planned".to_string(),
        ));
    }
    tx.commit().await?;

    let details = serde_json::json!({ "title": current.title });
    let _ = crate::audit::log(&db, ctx.user_id, "assembly.deleted", "assembly", assembly_id, details)
        .await;

    Ok(HttpResponse::NoContent().finish())
}
