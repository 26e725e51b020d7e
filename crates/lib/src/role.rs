use serde::{Deserialize, Serialize};

use crate::model::tagged_enum;
use crate::{Result, UnknownTag};

tagged_enum! {
    /// The portal's user roles. Anonymous visitors carry no role at all.
    pub enum Role {
        Normal => "normal",
        Government => "government",
        MinistryTribal => "ministry_tribal",
        WelfareDept => "welfare_dept",
        ForestRevenue => "forest_revenue",
        PlanningDevelop => "planning_develop",
        Ngo => "ngo",
    }
}

impl Role {
    /// Parses a role tag, also accepting `local`, the tag the local dashboard
    /// route uses for ordinary citizens.
    pub fn parse_tag(tag: &str) -> std::result::Result<Role, UnknownTag> {
        match tag {
            "local" => Ok(Role::Normal),
            other => other.parse(),
        }
    }

    /// Department roles routed to the government dashboard on a role mismatch.
    pub fn is_government_side(&self) -> bool {
        matches!(
            self,
            Role::Government
                | Role::MinistryTribal
                | Role::WelfareDept
                | Role::ForestRevenue
                | Role::PlanningDevelop
        )
    }
}

#[derive(Serialize, Debug, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct RolePermissions {
    pub can_edit_claims: bool,
    pub can_approve_claims: bool,
    pub can_view_all_complaints: bool,
    pub can_edit_complaints: bool,
    #[serde(rename = "canSubmitFRAApplications")]
    pub can_submit_fra_applications: bool,
    pub can_view_analytics: bool,
    pub can_manage_users: bool,
    pub can_upload_documents: bool,
    pub can_generate_reports: bool,
    pub can_access_map: bool,
    pub can_edit_village_data: bool,
    pub can_manage_alerts: bool,
    pub department_specific_features: &'static [&'static str],
    /// Upload limit in megabytes.
    pub max_file_upload_size: u64,
    pub allowed_file_types: &'static [&'static str],
}

impl RolePermissions {
    pub fn require(&self, granted: bool, what: &'static str) -> Result<()> {
        if granted {
            Ok(())
        } else {
            Err(crate::PortalError::Forbidden(what))
        }
    }
}

const BASE_FILE_TYPES: &[&str] = &["pdf", "jpg", "jpeg", "png", "doc", "docx"];

pub const NORMAL: RolePermissions = RolePermissions {
    can_edit_claims: false,
    can_approve_claims: false,
    can_view_all_complaints: false,
    can_edit_complaints: false,
    can_submit_fra_applications: true,
    can_view_analytics: false,
    can_manage_users: false,
    can_upload_documents: true,
    can_generate_reports: false,
    can_access_map: true,
    can_edit_village_data: false,
    can_manage_alerts: false,
    department_specific_features: &[
        "Submit complaints",
        "Track applications",
        "View basic information",
    ],
    max_file_upload_size: 10,
    allowed_file_types: BASE_FILE_TYPES,
};

pub const GOVERNMENT: RolePermissions = RolePermissions {
    can_edit_claims: true,
    can_approve_claims: true,
    can_view_all_complaints: true,
    can_edit_complaints: true,
    can_submit_fra_applications: true,
    can_view_analytics: true,
    can_manage_users: true,
    can_upload_documents: true,
    can_generate_reports: true,
    can_access_map: true,
    can_edit_village_data: true,
    can_manage_alerts: true,
    department_specific_features: &[
        "Full system access",
        "User management",
        "System configuration",
        "All analytics",
    ],
    max_file_upload_size: 50,
    allowed_file_types: &["pdf", "jpg", "jpeg", "png", "doc", "docx", "xlsx", "csv"],
};

pub const MINISTRY_TRIBAL: RolePermissions = RolePermissions {
    can_edit_claims: true,
    can_approve_claims: true,
    can_view_all_complaints: true,
    can_edit_complaints: true,
    can_submit_fra_applications: true,
    can_view_analytics: true,
    can_manage_users: false,
    can_upload_documents: true,
    can_generate_reports: true,
    can_access_map: true,
    can_edit_village_data: true,
    can_manage_alerts: true,
    department_specific_features: &[
        "Tribal rights management",
        "Tribal analytics",
        "Community coordination",
        "Tribal welfare reports",
    ],
    max_file_upload_size: 30,
    allowed_file_types: &["pdf", "jpg", "jpeg", "png", "doc", "docx", "xlsx"],
};

pub const WELFARE_DEPT: RolePermissions = RolePermissions {
    can_edit_claims: false,
    can_approve_claims: false,
    can_view_all_complaints: true,
    can_edit_complaints: false,
    can_submit_fra_applications: false,
    can_view_analytics: true,
    can_manage_users: false,
    can_upload_documents: true,
    can_generate_reports: true,
    can_access_map: true,
    can_edit_village_data: false,
    can_manage_alerts: false,
    department_specific_features: &[
        "Welfare tracking",
        "Social impact analysis",
        "Community welfare reports",
        "Beneficiary management",
    ],
    max_file_upload_size: 25,
    allowed_file_types: BASE_FILE_TYPES,
};

pub const FOREST_REVENUE: RolePermissions = RolePermissions {
    can_edit_claims: true,
    can_approve_claims: false,
    can_view_all_complaints: true,
    can_edit_complaints: true,
    can_submit_fra_applications: true,
    can_view_analytics: true,
    can_manage_users: false,
    can_upload_documents: true,
    can_generate_reports: true,
    can_access_map: true,
    can_edit_village_data: true,
    can_manage_alerts: true,
    department_specific_features: &[
        "Revenue tracking",
        "Forest mapping",
        "Revenue analytics",
        "Land records management",
    ],
    max_file_upload_size: 40,
    allowed_file_types: &[
        "pdf", "jpg", "jpeg", "png", "doc", "docx", "xlsx", "csv", "kml",
    ],
};

pub const PLANNING_DEVELOP: RolePermissions = RolePermissions {
    can_edit_claims: false,
    can_approve_claims: false,
    can_view_all_complaints: true,
    can_edit_complaints: false,
    can_submit_fra_applications: false,
    can_view_analytics: true,
    can_manage_users: false,
    can_upload_documents: true,
    can_generate_reports: true,
    can_access_map: true,
    can_edit_village_data: false,
    can_manage_alerts: false,
    department_specific_features: &[
        "Development planning",
        "Infrastructure analysis",
        "Project tracking",
        "Development reports",
    ],
    max_file_upload_size: 35,
    allowed_file_types: &["pdf", "jpg", "jpeg", "png", "doc", "docx", "xlsx", "csv"],
};

pub const NGO: RolePermissions = RolePermissions {
    can_edit_claims: false,
    can_approve_claims: false,
    can_view_all_complaints: false,
    can_edit_complaints: false,
    can_submit_fra_applications: false,
    can_view_analytics: false,
    can_manage_users: false,
    can_upload_documents: true,
    can_generate_reports: false,
    can_access_map: true,
    can_edit_village_data: false,
    can_manage_alerts: false,
    department_specific_features: &[
        "Community support",
        "Advocacy tools",
        "Impact assessment",
        "Community reports",
    ],
    max_file_upload_size: 20,
    allowed_file_types: BASE_FILE_TYPES,
};

/// What an anonymous visitor may do: look at the map.
pub const ANONYMOUS: RolePermissions = RolePermissions {
    can_edit_claims: false,
    can_approve_claims: false,
    can_view_all_complaints: false,
    can_edit_complaints: false,
    can_submit_fra_applications: false,
    can_view_analytics: false,
    can_manage_users: false,
    can_upload_documents: false,
    can_generate_reports: false,
    can_access_map: true,
    can_edit_village_data: false,
    can_manage_alerts: false,
    department_specific_features: &[],
    max_file_upload_size: 0,
    allowed_file_types: &[],
};

pub fn permissions(role: Option<Role>) -> &'static RolePermissions {
    match role {
        None => &ANONYMOUS,
        Some(Role::Normal) => &NORMAL,
        Some(Role::Government) => &GOVERNMENT,
        Some(Role::MinistryTribal) => &MINISTRY_TRIBAL,
        Some(Role::WelfareDept) => &WELFARE_DEPT,
        Some(Role::ForestRevenue) => &FOREST_REVENUE,
        Some(Role::PlanningDevelop) => &PLANNING_DEVELOP,
        Some(Role::Ngo) => &NGO,
    }
}

tagged_enum! {
    pub enum NavTab {
        Dashboard => "dashboard",
        Map => "map",
        Analytics => "analytics",
        FraApplications => "fra-applications",
        Complaints => "complaints",
        Alerts => "alerts",
        AiInsights => "ai-insights",
        RoleDashboard => "role-dashboard",
    }
}

/// The header tabs shown to `role`, in display order.
pub fn navigation_tabs(role: Option<Role>) -> Vec<NavTab> {
    let perms = permissions(role);
    let mut tabs = vec![NavTab::Dashboard];

    if perms.can_access_map {
        tabs.push(NavTab::Map);
    }
    if perms.can_view_analytics {
        tabs.push(NavTab::Analytics);
    }
    if perms.can_submit_fra_applications {
        tabs.push(NavTab::FraApplications);
    }
    // Complaints are a community-facing feature only.
    if matches!(role, Some(Role::Normal | Role::Ngo)) {
        tabs.push(NavTab::Complaints);
    }
    if perms.can_manage_alerts {
        tabs.push(NavTab::Alerts);
    }
    if matches!(
        role,
        Some(Role::Government | Role::MinistryTribal | Role::ForestRevenue)
    ) {
        tabs.push(NavTab::AiInsights);
    }
    if role.is_some() {
        tabs.push(NavTab::RoleDashboard);
    }

    tabs
}

pub const LOGIN_PATH: &str = "/login";
pub const GOVERNMENT_DASHBOARD: &str = "/government-dashboard";
pub const LOCAL_DASHBOARD: &str = "/local-dashboard";

pub fn dashboard_path(role: Option<Role>) -> &'static str {
    match role {
        Some(Role::Government) => GOVERNMENT_DASHBOARD,
        Some(Role::MinistryTribal) => "/tribal-dashboard",
        Some(Role::WelfareDept) => "/welfare-dashboard",
        Some(Role::ForestRevenue) => "/forest-revenue-dashboard",
        Some(Role::PlanningDevelop) => "/planning-development-dashboard",
        Some(Role::Ngo) => "/ngo-dashboard",
        Some(Role::Normal) | None => LOCAL_DASHBOARD,
    }
}

/// Who is looking at a page: `None` for anonymous visitors, otherwise the
/// signed-in user's (possibly not yet selected) role.
pub type Viewer = Option<Option<Role>>;

#[derive(Serialize, Debug, Clone, PartialEq, Eq)]
#[serde(tag = "decision", rename_all = "snake_case")]
pub enum RouteDecision {
    Allow,
    Redirect { to: String },
    NotFound,
}

impl RouteDecision {
    fn redirect(to: impl Into<String>) -> Self {
        RouteDecision::Redirect { to: to.into() }
    }
}

/// The protected-route check: signed-out viewers go to the login page and
/// viewers with the wrong role go to the dashboard family of their own role.
pub fn guard_route(viewer: Viewer, required: Option<Role>) -> RouteDecision {
    let Some(role) = viewer else {
        return RouteDecision::redirect(LOGIN_PATH);
    };

    match required {
        Some(required) if role != Some(required) => {
            if role.is_some_and(|r| r.is_government_side()) {
                RouteDecision::redirect(GOVERNMENT_DASHBOARD)
            } else {
                RouteDecision::redirect(LOCAL_DASHBOARD)
            }
        }
        _ => RouteDecision::Allow,
    }
}

const PUBLIC_ROUTES: &[&str] = &[
    "/",
    "/limited",
    "/login",
    "/role-selection",
    "/signup",
    "/local-dashboard",
    "/docs",
    "/security",
    "/status",
    "/satkosia",
    "/mota-info",
];

const PROTECTED_ROUTES: &[(&str, Role)] = &[
    ("/government-dashboard", Role::Government),
    ("/tribal-dashboard", Role::MinistryTribal),
    ("/welfare-dashboard", Role::WelfareDept),
    ("/forest-revenue-dashboard", Role::ForestRevenue),
    ("/planning-development-dashboard", Role::PlanningDevelop),
    ("/ngo-dashboard", Role::Ngo),
];

/// Old top-level paths that now live as tabs inside a dashboard.
pub fn legacy_redirect(path: &str, role: Option<Role>) -> Option<String> {
    let government = role == Some(Role::Government);
    let tabbed = |tab: &str| {
        if government {
            format!("{GOVERNMENT_DASHBOARD}?tab={tab}")
        } else {
            format!("{LOCAL_DASHBOARD}?tab={tab}")
        }
    };

    let to = match path {
        "/map" => match role {
            Some(Role::Government) => format!("{GOVERNMENT_DASHBOARD}?tab=map"),
            Some(Role::Normal) | None => format!("{LOCAL_DASHBOARD}?tab=map"),
            Some(other) => dashboard_path(Some(other)).to_string(),
        },
        "/analytics" => tabbed("analytics"),
        "/fra-applications" => tabbed("fra-applications"),
        "/complaints" => tabbed("complaints"),
        "/alerts" => tabbed("alerts"),
        "/ai-insights" => match role {
            Some(Role::Government) => format!("{GOVERNMENT_DASHBOARD}?tab=ai-insights"),
            Some(Role::ForestRevenue) => dashboard_path(role).to_string(),
            Some(Role::MinistryTribal) => dashboard_path(role).to_string(),
            _ => "/".to_string(),
        },
        _ => return None,
    };
    Some(to)
}

/// Resolves any client path (query string ignored) to a routing decision.
pub fn resolve_route(path: &str, viewer: Viewer) -> RouteDecision {
    let path = path.split('?').next().unwrap_or(path);
    let path = if path.len() > 1 {
        path.trim_end_matches('/')
    } else {
        path
    };

    if PUBLIC_ROUTES.contains(&path) {
        return RouteDecision::Allow;
    }
    if let Some((_, required)) = PROTECTED_ROUTES.iter().find(|(p, _)| *p == path) {
        return guard_route(viewer, Some(*required));
    }
    match legacy_redirect(path, viewer.flatten()) {
        Some(to) => RouteDecision::Redirect { to },
        None => RouteDecision::NotFound,
    }
}

#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq)]
#[serde(tag = "view", content = "role", rename_all = "snake_case")]
pub enum HomeView {
    /// Anonymous visitors get a read-only local dashboard.
    LimitedLocalDashboard,
    RoleSelection,
    Dashboard(Role),
}

/// What the portal root renders for `viewer`.
pub fn home_view(viewer: Viewer) -> HomeView {
    match viewer {
        None => HomeView::LimitedLocalDashboard,
        Some(None) => HomeView::RoleSelection,
        Some(Some(role)) => HomeView::Dashboard(role),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn permission_table_matches_roles() {
        assert!(permissions(Some(Role::Government)).can_manage_users);
        assert!(!permissions(Some(Role::MinistryTribal)).can_manage_users);
        assert!(!permissions(Some(Role::ForestRevenue)).can_approve_claims);
        assert!(permissions(Some(Role::ForestRevenue)).allowed_file_types.contains(&"kml"));
        assert_eq!(permissions(Some(Role::Ngo)).max_file_upload_size, 20);
        assert_eq!(permissions(None), &ANONYMOUS);
        assert!(permissions(None).can_access_map);
        assert!(permissions(None).allowed_file_types.is_empty());
    }

    #[test]
    fn tabs_per_role() {
        use NavTab::*;
        assert_eq!(navigation_tabs(None), vec![Dashboard, Map]);
        assert_eq!(
            navigation_tabs(Some(Role::Normal)),
            vec![Dashboard, Map, FraApplications, Complaints, RoleDashboard]
        );
        assert_eq!(
            navigation_tabs(Some(Role::Government)),
            vec![Dashboard, Map, Analytics, FraApplications, Alerts, AiInsights, RoleDashboard]
        );
        assert_eq!(
            navigation_tabs(Some(Role::WelfareDept)),
            vec![Dashboard, Map, Analytics, RoleDashboard]
        );
        assert_eq!(
            navigation_tabs(Some(Role::Ngo)),
            vec![Dashboard, Map, Complaints, RoleDashboard]
        );
        assert_eq!(
            navigation_tabs(Some(Role::ForestRevenue)),
            vec![Dashboard, Map, Analytics, FraApplications, Alerts, AiInsights, RoleDashboard]
        );
    }

    #[test]
    fn guard_redirects_by_role_family() {
        assert_eq!(
            guard_route(None, Some(Role::Government)),
            RouteDecision::redirect("/login")
        );
        assert_eq!(
            guard_route(Some(Some(Role::WelfareDept)), Some(Role::Government)),
            RouteDecision::redirect("/government-dashboard")
        );
        assert_eq!(
            guard_route(Some(Some(Role::Ngo)), Some(Role::Government)),
            RouteDecision::redirect("/local-dashboard")
        );
        assert_eq!(
            guard_route(Some(None), Some(Role::Ngo)),
            RouteDecision::redirect("/local-dashboard")
        );
        assert_eq!(
            guard_route(Some(Some(Role::Ngo)), Some(Role::Ngo)),
            RouteDecision::Allow
        );
        assert_eq!(guard_route(Some(None), None), RouteDecision::Allow);
    }

    #[test]
    fn resolves_public_protected_and_legacy_paths() {
        let gov = Some(Some(Role::Government));
        assert_eq!(resolve_route("/docs", None), RouteDecision::Allow);
        assert_eq!(resolve_route("/tribal-dashboard/", gov), RouteDecision::redirect("/government-dashboard"));
        assert_eq!(
            resolve_route("/map", gov),
            RouteDecision::redirect("/government-dashboard?tab=map")
        );
        assert_eq!(
            resolve_route("/map", Some(Some(Role::Ngo))),
            RouteDecision::redirect("/ngo-dashboard")
        );
        assert_eq!(
            resolve_route("/alerts?x=1", None),
            RouteDecision::redirect("/local-dashboard?tab=alerts")
        );
        assert_eq!(
            resolve_route("/ai-insights", Some(Some(Role::Normal))),
            RouteDecision::redirect("/")
        );
        assert_eq!(resolve_route("/nowhere", None), RouteDecision::NotFound);
    }

    #[test]
    fn home_view_and_role_tags() {
        assert_eq!(home_view(None), HomeView::LimitedLocalDashboard);
        assert_eq!(home_view(Some(None)), HomeView::RoleSelection);
        assert_eq!(
            home_view(Some(Some(Role::Ngo))),
            HomeView::Dashboard(Role::Ngo)
        );
        assert_eq!(Role::parse_tag("local"), Ok(Role::Normal));
        assert_eq!(Role::parse_tag("welfare_dept"), Ok(Role::WelfareDept));
        assert!(Role::parse_tag("admin").is_err());
        assert_eq!(dashboard_path(Some(Role::PlanningDevelop)), "/planning-development-dashboard");
    }
}
