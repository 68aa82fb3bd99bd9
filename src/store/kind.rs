#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DeletePolicy {
    /// Flip the active flag; the row stays addressable by id.
    Soft,
    /// Remove the row.
    Hard,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EntityKind {
    School,
    AcademicCycle,
    CalendarEvent,
    Group,
    Subject,
    SchoolEvent,
    ProspectLead,
}

impl EntityKind {
    pub fn table(self) -> &'static str {
        match self {
            Self::School => "escuelas",
            Self::AcademicCycle => "ciclos_escolares",
            Self::CalendarEvent => "calendario",
            Self::Group => "grupos",
            Self::Subject => "materias",
            Self::SchoolEvent => "eventos_escolares",
            Self::ProspectLead => "prospectos",
        }
    }

    /// Column holding the owning school. A school owns itself; leads have no
    /// owner until transferred.
    pub fn owner_column(self) -> Option<&'static str> {
        match self {
            Self::School => Some("id"),
            Self::ProspectLead => None,
            _ => Some("escuela_id"),
        }
    }

    pub fn active_column(self) -> Option<&'static str> {
        match self {
            Self::School | Self::Subject => Some("activa"),
            Self::AcademicCycle | Self::CalendarEvent | Self::Group | Self::SchoolEvent => {
                Some("activo")
            }
            Self::ProspectLead => None,
        }
    }

    /// Secondary foreign key a list may additionally filter on.
    pub fn secondary_column(self) -> Option<&'static str> {
        match self {
            Self::CalendarEvent => Some("ciclo_escolar_id"),
            _ => None,
        }
    }

    pub fn delete_policy(self) -> DeletePolicy {
        match self {
            Self::ProspectLead => DeletePolicy::Hard,
            _ => DeletePolicy::Soft,
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Self::School => "school",
            Self::AcademicCycle => "academic cycle",
            Self::CalendarEvent => "calendar event",
            Self::Group => "group",
            Self::Subject => "subject",
            Self::SchoolEvent => "school event",
            Self::ProspectLead => "prospect",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const ALL: [EntityKind; 7] = [
        EntityKind::School,
        EntityKind::AcademicCycle,
        EntityKind::CalendarEvent,
        EntityKind::Group,
        EntityKind::Subject,
        EntityKind::SchoolEvent,
        EntityKind::ProspectLead,
    ];

    #[test]
    fn only_leads_are_hard_deleted() {
        for kind in ALL {
            let expected = if kind == EntityKind::ProspectLead {
                DeletePolicy::Hard
            } else {
                DeletePolicy::Soft
            };
            assert_eq!(kind.delete_policy(), expected, "{}", kind.label());
        }
    }

    #[test]
    fn soft_deleted_kinds_have_an_active_column() {
        for kind in ALL {
            if kind.delete_policy() == DeletePolicy::Soft {
                assert!(kind.active_column().is_some(), "{}", kind.label());
                assert!(kind.owner_column().is_some(), "{}", kind.label());
            }
        }
    }
}
