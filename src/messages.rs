//! Localized user-visible strings.

use chrono::{DateTime, Datelike, Local, Timelike, Utc};

use crate::config::Locale;

/// Operation a user-visible failure is reported for.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Failure {
    NotAuthenticated,
    Create,
    Delete,
}

#[derive(Debug, Clone, Copy)]
pub struct Messages {
    locale: Locale,
}

const MONTHS_ES: [&str; 12] = [
    "enero", "febrero", "marzo", "abril", "mayo", "junio", "julio", "agosto",
    "septiembre", "octubre", "noviembre", "diciembre",
];

const MONTHS_EN: [&str; 12] = [
    "January", "February", "March", "April", "May", "June", "July", "August",
    "September", "October", "November", "December",
];

impl Messages {
    pub fn new(locale: Locale) -> Self {
        Self { locale }
    }

    pub fn locale(&self) -> Locale {
        self.locale
    }

    /// Generic message shown for a failed operation.
    pub fn failure(&self, failure: Failure) -> &'static str {
        match (self.locale, failure) {
            (Locale::Es, Failure::NotAuthenticated) => "Usuario no autenticado",
            (Locale::Es, Failure::Create) => "Error al crear el post",
            (Locale::Es, Failure::Delete) => "Error al eliminar el post",
            (Locale::En, Failure::NotAuthenticated) => "User is not authenticated",
            (Locale::En, Failure::Create) => "Failed to create the post",
            (Locale::En, Failure::Delete) => "Failed to delete the post",
        }
    }

    pub fn empty_list(&self) -> &'static str {
        match self.locale {
            Locale::Es => "No tienes posts aún. ¡Crea tu primer post!",
            Locale::En => "You have no posts yet. Create your first post!",
        }
    }

    pub fn list_header(&self, count: usize) -> String {
        match self.locale {
            Locale::Es => format!("Mis Posts ({count})"),
            Locale::En => format!("My Posts ({count})"),
        }
    }

    pub fn confirm_delete(&self) -> &'static str {
        match self.locale {
            Locale::Es => "¿Estás seguro de que quieres eliminar este post?",
            Locale::En => "Are you sure you want to delete this post?",
        }
    }

    pub fn created(&self) -> &'static str {
        match self.locale {
            Locale::Es => "Post creado",
            Locale::En => "Post created",
        }
    }

    pub fn deleted(&self) -> &'static str {
        match self.locale {
            Locale::Es => "Post eliminado",
            Locale::En => "Post deleted",
        }
    }

    /// "Creado el 1 de mayo de 2024, 10:30" in the local time zone.
    pub fn created_on(&self, at: DateTime<Utc>) -> String {
        let local = at.with_timezone(&Local);
        let month = local.month0() as usize;
        match self.locale {
            Locale::Es => format!(
                "Creado el {} de {} de {}, {:02}:{:02}",
                local.day(),
                MONTHS_ES[month],
                local.year(),
                local.hour(),
                local.minute()
            ),
            Locale::En => format!(
                "Created on {} {}, {}, {:02}:{:02}",
                MONTHS_EN[month],
                local.day(),
                local.year(),
                local.hour(),
                local.minute()
            ),
        }
    }
}

impl Default for Messages {
    fn default() -> Self {
        Self::new(Locale::default())
    }
}
