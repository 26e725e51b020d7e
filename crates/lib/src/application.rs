use chrono::{DateTime, Utc};
use log::debug;
use serde::{Deserialize, Serialize};

use crate::model::tagged_enum;
use crate::{
    Coordinates, FieldErrors, PortalError, Priority, Result, Role, RolePermissions, UnknownTag,
    User, parse_choice,
};

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq, Hash)]
pub struct ApplicationId(pub String);

impl std::fmt::Display for ApplicationId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

tagged_enum! {
    pub enum LandType {
        Individual => "individual",
        Community => "community",
        Habitation => "habitation",
    }
}

impl Default for LandType {
    fn default() -> Self {
        LandType::Individual
    }
}

tagged_enum! {
    pub enum FraClaimType {
        IndividualForestRights => "individual_forest_rights",
        CommunityForestRights => "community_forest_rights",
        CommunityForestResourceRights => "community_forest_resource_rights",
    }
}

impl Default for FraClaimType {
    fn default() -> Self {
        FraClaimType::IndividualForestRights
    }
}

tagged_enum! {
    pub enum ApplicationStatus {
        Draft => "draft",
        Submitted => "submitted",
        UnderReview => "under_review",
        Approved => "approved",
        Rejected => "rejected",
    }
}

impl ApplicationStatus {
    pub fn can_become(self, next: ApplicationStatus) -> bool {
        use ApplicationStatus::*;
        matches!(
            (self, next),
            (Draft, Submitted)
                | (Submitted, UnderReview | Approved | Rejected)
                | (UnderReview, Approved | Rejected)
        )
    }
}

/// An uploaded file, as far as the portal cares about it.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct SupportingDocument {
    pub name: String,
    /// Size in bytes.
    pub size: u64,
}

impl SupportingDocument {
    pub fn extension(&self) -> String {
        self.name
            .rsplit_once('.')
            .map(|(_, ext)| ext.to_lowercase())
            .unwrap_or_default()
    }
}

/// What the applicant fills in on the claim form.
#[derive(Serialize, Deserialize, Debug, Default, Clone, PartialEq)]
#[serde(default, rename_all = "camelCase")]
pub struct ApplicationForm {
    pub applicant_name: String,
    pub village: String,
    pub district: String,
    pub state: String,
    /// Free text, e.g. `"4.5 hectares"`.
    pub land_area: String,
    pub land_type: LandType,
    pub claim_type: FraClaimType,
    pub description: String,
    pub supporting_documents: Vec<SupportingDocument>,
    pub priority: Priority,
    pub estimated_value: Option<f64>,
    pub coordinates: Option<Coordinates>,
}

impl ApplicationForm {
    pub fn validate(&self) -> Result<()> {
        let required = [
            ("applicantName", &self.applicant_name, "Applicant name is required"),
            ("village", &self.village, "Village is required"),
            ("district", &self.district, "District is required"),
            ("state", &self.state, "State is required"),
            ("landArea", &self.land_area, "Land area is required"),
            ("description", &self.description, "Description is required"),
        ];

        let errors: FieldErrors = required
            .into_iter()
            .filter(|(_, value, _)| value.trim().is_empty())
            .map(|(field, _, message)| (field, message.to_string()))
            .collect();

        if errors.is_empty() {
            Ok(())
        } else {
            Err(PortalError::Validation(errors))
        }
    }

    fn validate_draft(&self) -> Result<()> {
        if self.applicant_name.trim().is_empty() {
            let mut errors = FieldErrors::new();
            errors.insert("applicantName", "Applicant name is required".to_string());
            return Err(PortalError::Validation(errors));
        }
        Ok(())
    }
}

#[derive(Serialize, Debug, Clone, PartialEq, Eq)]
pub struct UploadCheck {
    pub accepted: Vec<SupportingDocument>,
    pub rejected: Vec<SupportingDocument>,
    pub message: Option<String>,
}

impl UploadCheck {
    pub fn all_accepted(&self) -> bool {
        self.rejected.is_empty()
    }
}

fn require_uploads_allowed(perms: &RolePermissions, form: &ApplicationForm) -> Result<()> {
    match check_uploads(perms, &form.supporting_documents).message {
        Some(message) => {
            let mut errors = FieldErrors::new();
            errors.insert("files", message);
            Err(PortalError::Validation(errors))
        }
        None => Ok(()),
    }
}

/// Sorts `files` into what the role may upload and what it may not.
pub fn check_uploads(perms: &RolePermissions, files: &[SupportingDocument]) -> UploadCheck {
    let max_bytes = perms.max_file_upload_size * 1024 * 1024;
    let (accepted, rejected): (Vec<_>, Vec<_>) = files.iter().cloned().partition(|file| {
        perms
            .allowed_file_types
            .contains(&file.extension().as_str())
            && file.size <= max_bytes
    });

    let message = (!rejected.is_empty()).then(|| {
        format!(
            "Some files were rejected. Allowed types: {}. Max size: {}MB",
            perms.allowed_file_types.join(", "),
            perms.max_file_upload_size
        )
    });

    UploadCheck {
        accepted,
        rejected,
        message,
    }
}

#[derive(Serialize, Debug, Clone, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct FraApplication {
    pub id: ApplicationId,
    #[serde(flatten)]
    pub form: ApplicationForm,
    pub status: ApplicationStatus,
    pub submitted_by: String,
    pub submitted_at: Option<DateTime<Utc>>,
    pub reviewed_by: Option<String>,
    pub review_notes: Option<String>,
}

pub fn can_edit(app: &FraApplication, role: Option<Role>) -> bool {
    crate::permissions(role).can_edit_claims
        || (app.status == ApplicationStatus::Draft && role == Some(Role::Normal))
}

pub fn can_approve(app: &FraApplication, role: Option<Role>) -> bool {
    crate::permissions(role).can_approve_claims && app.status == ApplicationStatus::Submitted
}

pub fn can_delete(app: &FraApplication, role: Option<Role>) -> bool {
    can_edit(app, role)
}

#[derive(Debug, Default, Clone)]
pub struct ApplicationFilter {
    pub search: Option<String>,
    pub status: Option<ApplicationStatus>,
    pub priority: Option<Priority>,
}

impl ApplicationFilter {
    pub fn from_choices(
        search: Option<&str>,
        status: Option<&str>,
        priority: Option<&str>,
    ) -> std::result::Result<Self, UnknownTag> {
        Ok(ApplicationFilter {
            search: search
                .map(str::trim)
                .filter(|s| !s.is_empty())
                .map(str::to_lowercase),
            status: parse_choice(status, &[])?,
            priority: parse_choice(priority, &[])?,
        })
    }

    pub fn matches(&self, app: &FraApplication) -> bool {
        let matches_search = self.search.as_deref().is_none_or(|term| {
            let term = term.to_lowercase();
            [
                app.form.applicant_name.as_str(),
                app.form.village.as_str(),
                app.form.district.as_str(),
                app.id.0.as_str(),
            ]
            .iter()
            .any(|field| field.to_lowercase().contains(&term))
        });

        matches_search
            && self.status.is_none_or(|s| app.status == s)
            && self.priority.is_none_or(|p| app.form.priority == p)
    }
}

/// Submitted and drafted claims, newest first.
#[derive(Default)]
pub struct ApplicationRegistry {
    applications: Vec<FraApplication>,
}

fn sees_everything(user: &User) -> bool {
    let perms = user.permissions();
    perms.can_edit_claims || perms.can_approve_claims
}

impl ApplicationRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    fn next_id(&self, now: DateTime<Utc>) -> ApplicationId {
        let mut millis = now.timestamp_millis();
        loop {
            let id = ApplicationId(format!("FRA-{millis}"));
            if self.applications.iter().all(|a| a.id != id) {
                return id;
            }
            millis += 1;
        }
    }

    fn insert(
        &mut self,
        form: ApplicationForm,
        status: ApplicationStatus,
        user: &User,
        now: DateTime<Utc>,
    ) -> Result<&FraApplication> {
        let perms = user.permissions();
        perms.require(perms.can_submit_fra_applications, "submit FRA applications")?;

        require_uploads_allowed(perms, &form)?;

        let application = FraApplication {
            id: self.next_id(now),
            form,
            status,
            submitted_by: user.uid.clone(),
            submitted_at: (status == ApplicationStatus::Submitted).then_some(now),
            reviewed_by: None,
            review_notes: None,
        };
        debug!("Recording application {} as {}", application.id, status);
        self.applications.insert(0, application);
        Ok(&self.applications[0])
    }

    pub fn submit(
        &mut self,
        form: ApplicationForm,
        user: &User,
        now: DateTime<Utc>,
    ) -> Result<&FraApplication> {
        form.validate()?;
        self.insert(form, ApplicationStatus::Submitted, user, now)
    }

    pub fn save_draft(
        &mut self,
        form: ApplicationForm,
        user: &User,
        now: DateTime<Utc>,
    ) -> Result<&FraApplication> {
        form.validate_draft()?;
        self.insert(form, ApplicationStatus::Draft, user, now)
    }

    fn visible(&self, user: &User, app: &FraApplication) -> bool {
        sees_everything(user) || app.submitted_by == user.uid
    }

    pub fn list<'a>(&'a self, user: &User, filter: &ApplicationFilter) -> Vec<&'a FraApplication> {
        self.applications
            .iter()
            .filter(|app| self.visible(user, app) && filter.matches(app))
            .collect()
    }

    pub fn get(&self, id: &ApplicationId, user: &User) -> Result<&FraApplication> {
        self.applications
            .iter()
            .find(|app| &app.id == id && self.visible(user, app))
            .ok_or_else(|| PortalError::not_found("application", id))
    }

    fn position(&self, id: &ApplicationId, user: &User) -> Result<usize> {
        self.applications
            .iter()
            .position(|app| &app.id == id && self.visible(user, app))
            .ok_or_else(|| PortalError::not_found("application", id))
    }

    /// Replaces the form contents of a record the user may edit.
    pub fn update(
        &mut self,
        id: &ApplicationId,
        form: ApplicationForm,
        user: &User,
    ) -> Result<&FraApplication> {
        let index = self.position(id, user)?;
        let app = &mut self.applications[index];
        if !can_edit(app, user.role) {
            return Err(PortalError::Forbidden("edit this application"));
        }
        if app.status == ApplicationStatus::Draft {
            form.validate_draft()?;
        } else {
            form.validate()?;
        }
        require_uploads_allowed(user.permissions(), &form)?;
        app.form = form;
        Ok(app)
    }

    pub fn change_status(
        &mut self,
        id: &ApplicationId,
        next: ApplicationStatus,
        notes: Option<String>,
        user: &User,
        now: DateTime<Utc>,
    ) -> Result<&FraApplication> {
        let index = self.position(id, user)?;
        let app = &mut self.applications[index];

        if !app.status.can_become(next) {
            return Err(PortalError::Transition {
                kind: "application",
                from: app.status.as_str(),
                to: next.as_str(),
            });
        }

        if next == ApplicationStatus::Submitted {
            if app.submitted_by != user.uid {
                return Err(PortalError::Forbidden("submit someone else's draft"));
            }
            app.form.validate()?;
            app.submitted_at = Some(now);
        } else {
            let perms = user.permissions();
            perms.require(perms.can_approve_claims, "review applications")?;
            if matches!(next, ApplicationStatus::Approved | ApplicationStatus::Rejected) {
                app.reviewed_by = Some(user.display_name.clone());
                app.review_notes = notes.filter(|n| !n.trim().is_empty());
            }
        }

        debug!("Application {} moved from {} to {}", app.id, app.status, next);
        app.status = next;
        Ok(app)
    }

    pub fn delete(&mut self, id: &ApplicationId, user: &User) -> Result<FraApplication> {
        let index = self.position(id, user)?;
        if !can_delete(&self.applications[index], user.role) {
            return Err(PortalError::Forbidden("delete this application"));
        }
        Ok(self.applications.remove(index))
    }

    pub fn all(&self) -> &[FraApplication] {
        &self.applications
    }

    pub fn len(&self) -> usize {
        self.applications.len()
    }

    pub fn is_empty(&self) -> bool {
        self.applications.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use chrono::TimeZone;

    use super::*;
    use crate::authenticate;

    fn form() -> ApplicationForm {
        ApplicationForm {
            applicant_name: "Ramesh Majhi".to_string(),
            village: "Kendupali".to_string(),
            district: "Kalahandi".to_string(),
            state: "Odisha".to_string(),
            land_area: "4.5 hectares".to_string(),
            description: "Cultivated by my family for three generations".to_string(),
            supporting_documents: vec![SupportingDocument {
                name: "patta.PDF".to_string(),
                size: 2 * 1024 * 1024,
            }],
            ..Default::default()
        }
    }

    fn now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 3, 1, 10, 0, 0).unwrap()
    }

    #[test]
    fn missing_fields_reported_individually() {
        let Err(PortalError::Validation(errors)) = ApplicationForm::default().validate() else {
            panic!("expected validation errors");
        };
        assert_eq!(errors.len(), 6);
        assert_eq!(errors["applicantName"], "Applicant name is required");
        assert_eq!(errors["landArea"], "Land area is required");

        let mut blank = form();
        blank.village = "   ".to_string();
        let Err(PortalError::Validation(errors)) = blank.validate() else {
            panic!("expected validation errors");
        };
        assert_eq!(errors.keys().collect::<Vec<_>>(), vec![&"village"]);
    }

    #[test]
    fn uploads_checked_against_role_limits() {
        let files = vec![
            SupportingDocument {
                name: "map.kml".to_string(),
                size: 1024,
            },
            SupportingDocument {
                name: "photo.jpg".to_string(),
                size: 11 * 1024 * 1024,
            },
            SupportingDocument {
                name: "deed.docx".to_string(),
                size: 1024,
            },
        ];

        let citizen = check_uploads(crate::permissions(Some(Role::Normal)), &files);
        assert_eq!(citizen.accepted.len(), 1);
        assert_eq!(
            citizen.message.as_deref(),
            Some("Some files were rejected. Allowed types: pdf, jpg, jpeg, png, doc, docx. Max size: 10MB")
        );

        let forest = check_uploads(crate::permissions(Some(Role::ForestRevenue)), &files);
        assert!(forest.all_accepted());
    }

    #[test]
    fn edits_cannot_attach_disallowed_files() {
        let citizen = authenticate("user@fraportal.com", "user123").unwrap();
        let mut registry = ApplicationRegistry::new();
        let id = registry.save_draft(form(), &citizen, now()).unwrap().id.clone();

        let mut edited = form();
        edited.supporting_documents = vec![SupportingDocument {
            name: "map.kml".to_string(),
            size: 50 * 1024 * 1024,
        }];
        let Err(PortalError::Validation(errors)) = registry.update(&id, edited, &citizen) else {
            panic!("expected the upload to be refused");
        };
        assert!(errors["files"].starts_with("Some files were rejected"));
        assert_eq!(
            registry.get(&id, &citizen).unwrap().form.supporting_documents,
            form().supporting_documents
        );
    }

    #[test]
    fn submit_assigns_id_and_scopes_listing() {
        let citizen = authenticate("user@fraportal.com", "user123").unwrap();
        let gov = authenticate("gov@fraportal.com", "gov123").unwrap();
        let ngo = authenticate("ngo@fraportal.com", "ngo123").unwrap();
        let mut registry = ApplicationRegistry::new();

        let first = registry.submit(form(), &citizen, now()).unwrap().id.clone();
        let second = registry.submit(form(), &citizen, now()).unwrap().id.clone();
        assert_eq!(first.0, format!("FRA-{}", now().timestamp_millis()));
        assert_ne!(first, second);

        assert!(matches!(
            registry.submit(form(), &ngo, now()),
            Err(PortalError::Forbidden(_))
        ));

        let welfare = authenticate("welfare@fraportal.com", "welfare123").unwrap();
        assert_eq!(registry.list(&citizen, &ApplicationFilter::default()).len(), 2);
        assert_eq!(registry.list(&gov, &ApplicationFilter::default()).len(), 2);
        assert!(registry.list(&welfare, &ApplicationFilter::default()).is_empty());
        assert!(registry.get(&first, &welfare).is_err());

        let search = ApplicationFilter::from_choices(Some("KENDU"), Some("submitted"), Some("all")).unwrap();
        assert_eq!(registry.list(&gov, &search).len(), 2);
        let drafts = ApplicationFilter::from_choices(None, Some("draft"), None).unwrap();
        assert!(registry.list(&gov, &drafts).is_empty());
    }

    #[test]
    fn review_follows_transition_table() {
        let citizen = authenticate("user@fraportal.com", "user123").unwrap();
        let gov = authenticate("gov@fraportal.com", "gov123").unwrap();
        let forest = authenticate("forest@fraportal.com", "forest123").unwrap();
        let mut registry = ApplicationRegistry::new();

        let draft = registry.save_draft(
            ApplicationForm {
                applicant_name: "Sita".to_string(),
                ..Default::default()
            },
            &citizen,
            now(),
        )
        .unwrap();
        assert!(can_edit(draft, citizen.role));
        assert!(!can_approve(draft, gov.role));
        let draft_id = draft.id.clone();

        assert!(matches!(
            registry.change_status(&draft_id, ApplicationStatus::Approved, None, &gov, now()),
            Err(PortalError::Transition { .. })
        ));
        // An incomplete draft cannot be submitted.
        assert!(matches!(
            registry.change_status(&draft_id, ApplicationStatus::Submitted, None, &citizen, now()),
            Err(PortalError::Validation(_))
        ));
        registry.update(&draft_id, form(), &citizen).unwrap();
        registry
            .change_status(&draft_id, ApplicationStatus::Submitted, None, &citizen, now())
            .unwrap();
        assert!(registry.update(&draft_id, form(), &citizen).is_err());

        assert!(matches!(
            registry.change_status(&draft_id, ApplicationStatus::Approved, None, &forest, now()),
            Err(PortalError::Forbidden(_))
        ));
        let approved = registry
            .change_status(
                &draft_id,
                ApplicationStatus::Approved,
                Some("Verified on site".to_string()),
                &gov,
                now(),
            )
            .unwrap();
        assert_eq!(approved.reviewed_by.as_deref(), Some("gov"));
        assert_eq!(approved.review_notes.as_deref(), Some("Verified on site"));

        assert!(matches!(
            registry.change_status(&draft_id, ApplicationStatus::Rejected, None, &gov, now()),
            Err(PortalError::Transition { .. })
        ));
        assert!(registry.delete(&draft_id, &citizen).is_err());
        registry.delete(&draft_id, &gov).unwrap();
        assert!(registry.is_empty());
    }

    #[test]
    fn serializes_flat_camel_case() {
        let citizen = authenticate("user@fraportal.com", "user123").unwrap();
        let mut registry = ApplicationRegistry::new();
        let app = registry.submit(form(), &citizen, now()).unwrap();
        let json = serde_json::to_value(app).unwrap();
        assert_eq!(json["applicantName"], "Ramesh Majhi");
        assert_eq!(json["claimType"], "individual_forest_rights");
        assert_eq!(json["status"], "submitted");
        assert_eq!(json["submittedBy"], "mock-normal-user-id");
    }
}
