//! Static screen content.
//!
//! Everything shown on the authenticated screens is fixed data: a hero
//! block, two persona-specific card sets and six feature sections.

use serde::{Deserialize, Serialize};

/// Audience the info cards are tailored to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Persona {
    #[default]
    Parent,
    Student,
}

impl Persona {
    pub fn all() -> &'static [Persona] {
        &[Persona::Parent, Persona::Student]
    }

    /// Config value for this persona.
    pub fn as_str(self) -> &'static str {
        match self {
            Persona::Parent => "parent",
            Persona::Student => "student",
        }
    }

    /// Label shown on the persona toggle.
    pub fn label(self) -> &'static str {
        match self {
            Persona::Parent => "Pais",
            Persona::Student => "Aluno",
        }
    }

    pub fn cards(self) -> &'static [InfoCard] {
        match self {
            Persona::Parent => PARENT_CARDS,
            Persona::Student => STUDENT_CARDS,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct InfoCard {
    pub label: &'static str,
    pub value: &'static str,
}

/// A feature section. The first action is the primary one.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Section {
    pub title: &'static str,
    pub body: &'static str,
    pub actions: &'static [&'static str],
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Hero {
    pub eyebrow: &'static str,
    pub title: &'static str,
    pub body: &'static str,
}

pub const HERO: Hero = Hero {
    eyebrow: "Guardiao Digital",
    title: "Seguranca preditiva em tempo real",
    body: "Um app unico para pais e alunos, com rotina segura, alertas preventivos e SOS contextual.",
};

pub const FOOTER: &str = "Guardiao Digital - MVP inicial";

pub const PARENT_CARDS: &[InfoCard] = &[
    InfoCard {
        label: "Status",
        value: "Dentro do padrao",
    },
    InfoCard {
        label: "Ultimo check-in",
        value: "Escola 12:05",
    },
    InfoCard {
        label: "Alertas",
        value: "1 preventivo",
    },
];

pub const STUDENT_CARDS: &[InfoCard] = &[
    InfoCard {
        label: "Rotina",
        value: "Ativa",
    },
    InfoCard {
        label: "Bateria",
        value: "78%",
    },
    InfoCard {
        label: "SOS",
        value: "Pronto",
    },
];

pub const SECTIONS: &[Section] = &[
    Section {
        title: "Boas-vindas",
        body: "Seguranca preditiva para quem voce ama. A rotina segura aprende o caminho e avisa antes do risco.",
        actions: &["Criar conta", "Entrar"],
    },
    Section {
        title: "Rotina segura inteligente",
        body: "Defina casa, escola e cursos. O app aprende horarios e rotas esperadas.",
        actions: &["Ativar rotina segura"],
    },
    Section {
        title: "Mapa e status",
        body: "Status: dentro do padrao. Ultimo check-in: Escola 12:05. Rota atual: casa -> escola.",
        actions: &["Ver detalhes"],
    },
    Section {
        title: "Alerta preventivo",
        body: "Desvio de rota detectado. Parada longa: 12 min.",
        actions: &["Confirmar seguro", "Abrir chat"],
    },
    Section {
        title: "SOS com prova contextual",
        body: "Envia localizacao, audio de 15s, status da bateria e ultimos pontos do trajeto.",
        actions: &["Acionar SOS", "Cancelar com PIN"],
    },
    Section {
        title: "Micro-licoes diarias",
        body: "Licoes de 1 a 2 minutos com dicas praticas e progresso semanal.",
        actions: &["Play", "Ver progresso"],
    },
];
