//! Compiled-in seed datasets.
//!
//! Each collection is written to the store from here the first time its key
//! is read and found absent.

use chrono::NaiveDate;

use crate::model::{
    AnswerOption, Bilingual, ChatChannel, ChatMessage, PlatformUser, ProgressDataPoint, Question,
    QuestionType, Resource, Skill, Specialization, Team, TestContext, Text, UserRole, UserStatus,
};

pub const DEFAULT_THEME: &str = "light";
pub const DEFAULT_ADMIN_PASSWORD: &str = "admin123";
pub const GENERAL_CHANNEL_ID: &str = "ai-assistant-general";
pub const PEDAGOGY_CHANNEL_ID: &str = "ai-pedagogy-coach";
pub const ASSISTANT_AVATAR: &str = "assistant";

fn option(id: &str, ar: &str, fr: &str) -> AnswerOption {
    AnswerOption {
        id: id.to_string(),
        text: Bilingual::new(ar, fr),
    }
}

pub fn texts() -> Vec<Text> {
    vec![
        Text {
            id: 1,
            title: Bilingual::new("التواصل داخل الفريق", "La communication en équipe"),
            specialization: Bilingual::new("التسيير", "Gestion"),
            content: Bilingual::new(
                "<p>التواصل الفعال أساس كل عمل جماعي ناجح. يعتمد على الإصغاء والوضوح والاحترام.</p>",
                "<p>Une communication efficace est la base de tout travail d'équipe réussi. Elle repose sur l'écoute, la clarté et le respect.</p>",
            ),
            questions: vec![
                Question {
                    id: 101,
                    text: Bilingual::new(
                        "ما هو أساس العمل الجماعي الناجح؟",
                        "Quelle est la base d'un travail d'équipe réussi ?",
                    ),
                    kind: QuestionType::MultipleChoice,
                    options: Some(vec![
                        option("a", "التواصل الفعال", "La communication efficace"),
                        option("b", "المنافسة", "La compétition"),
                        option("c", "العمل الفردي", "Le travail individuel"),
                    ]),
                    correct_answer_id: Some("a".to_string()),
                },
                Question {
                    id: 102,
                    text: Bilingual::new(
                        "اذكر مثالا عن الإصغاء الفعال في بيئة العمل.",
                        "Donnez un exemple d'écoute active au travail.",
                    ),
                    kind: QuestionType::OpenEnded,
                    options: None,
                    correct_answer_id: None,
                },
            ],
        },
        Text {
            id: 2,
            title: Bilingual::new("السلامة في ورشة العمل", "La sécurité à l'atelier"),
            specialization: Bilingual::new("الكهرباء", "Électricité"),
            content: Bilingual::new(
                "<p>قبل أي تدخل على دارة كهربائية يجب قطع التيار والتحقق من غيابه.</p>",
                "<p>Avant toute intervention sur un circuit électrique, il faut couper le courant et vérifier son absence.</p>",
            ),
            questions: vec![Question {
                id: 201,
                text: Bilingual::new(
                    "يمكن العمل على دارة كهربائية دون قطع التيار.",
                    "On peut intervenir sur un circuit sans couper le courant.",
                ),
                kind: QuestionType::TrueFalse,
                options: Some(vec![
                    option("true", "صحيح", "Vrai"),
                    option("false", "خطأ", "Faux"),
                ]),
                correct_answer_id: Some("false".to_string()),
            }],
        },
    ]
}

pub fn skills() -> Vec<Skill> {
    let skill = |id, title: (&str, &str), description: (&str, &str), icon: &str| Skill {
        id,
        title: Bilingual::new(title.0, title.1),
        description: Bilingual::new(description.0, description.1),
        icon: icon.to_string(),
    };
    vec![
        skill(
            1,
            ("التواصل", "Communication"),
            ("التعبير بوضوح والإصغاء للآخرين", "S'exprimer clairement et écouter les autres"),
            "message-circle",
        ),
        skill(
            2,
            ("العمل الجماعي", "Travail d'équipe"),
            ("التعاون لتحقيق هدف مشترك", "Coopérer pour atteindre un objectif commun"),
            "users",
        ),
        skill(
            3,
            ("حل المشكلات", "Résolution de problèmes"),
            ("تحليل الوضعيات واقتراح الحلول", "Analyser une situation et proposer des solutions"),
            "puzzle",
        ),
        skill(
            4,
            ("تسيير الوقت", "Gestion du temps"),
            ("ترتيب الأولويات واحترام الآجال", "Prioriser et respecter les délais"),
            "clock",
        ),
        skill(
            5,
            ("التفكير النقدي", "Esprit critique"),
            ("تقييم المعلومات قبل اتخاذ القرار", "Évaluer l'information avant de décider"),
            "brain",
        ),
        skill(
            6,
            ("القيادة", "Leadership"),
            ("تحفيز الفريق وتوجيهه", "Motiver et guider une équipe"),
            "flag",
        ),
    ]
}

pub fn specializations() -> Vec<Specialization> {
    vec![
        Specialization {
            id: 1,
            name: Bilingual::new("التسيير", "Gestion"),
            trainee_count: Some(24),
        },
        Specialization {
            id: 2,
            name: Bilingual::new("الكهرباء", "Électricité"),
            trainee_count: Some(18),
        },
        Specialization {
            id: 3,
            name: Bilingual::new("الإعلام الآلي", "Informatique"),
            trainee_count: None,
        },
    ]
}

pub fn teams() -> Vec<Team> {
    vec![
        Team {
            id: 1,
            name: Bilingual::new("فريق النجاح", "Équipe Réussite"),
            specialization: Bilingual::new("التسيير", "Gestion"),
            presentation_title: Bilingual::new("مشروع مقاولاتي", "Projet entrepreneurial"),
            members: vec!["Amina".into(), "Karim".into(), "Sara".into()],
            submitted_file_name: None,
            submitted_file_data: None,
            video_url: None,
            due_date: NaiveDate::from_ymd_opt(2025, 6, 15),
            team_leader: "Amina".into(),
        },
        Team {
            id: 2,
            name: Bilingual::new("فريق الطاقة", "Équipe Énergie"),
            specialization: Bilingual::new("الكهرباء", "Électricité"),
            presentation_title: Bilingual::new("الطاقة الشمسية", "L'énergie solaire"),
            members: vec!["Youssef".into(), "Nadia".into()],
            submitted_file_name: None,
            submitted_file_data: None,
            video_url: None,
            due_date: NaiveDate::from_ymd_opt(2025, 6, 22),
            team_leader: String::new(),
        },
    ]
}

pub fn test_contexts() -> Vec<TestContext> {
    vec![
        TestContext {
            id: 1,
            title: Bilingual::new("أساسيات التسيير", "Fondamentaux de la gestion"),
            content: Bilingual::new(
                "التسيير هو التخطيط والتنظيم والتوجيه والرقابة لتحقيق أهداف المؤسسة.",
                "La gestion consiste à planifier, organiser, diriger et contrôler pour atteindre les objectifs de l'entreprise.",
            ),
        },
        TestContext {
            id: 2,
            title: Bilingual::new("قواعد السلامة الكهربائية", "Règles de sécurité électrique"),
            content: Bilingual::new(
                "قطع التيار، التحقق من غيابه، التأريض، وضع الإشارات، ارتداء معدات الحماية.",
                "Consigner, vérifier l'absence de tension, mettre à la terre, baliser, porter les équipements de protection.",
            ),
        },
    ]
}

pub fn chat_channels() -> Vec<ChatChannel> {
    let general_prompt = Bilingual::new(
        "أنت مساعد تعليمي ودود يساعد المتكونين على فهم دروسهم. أجب بالعربية وبإيجاز.",
        "Tu es un assistant pédagogique bienveillant qui aide les stagiaires à comprendre leurs cours. Réponds en français, de façon concise.",
    );
    let coach_prompt = Bilingual::new(
        "أنت مدرب بيداغوجي يقترح أنشطة وتمارين مناسبة لمستوى المتكون.",
        "Tu es un coach pédagogique qui propose des activités et exercices adaptés au niveau du stagiaire.",
    );
    vec![
        ChatChannel {
            id: GENERAL_CHANNEL_ID.to_string(),
            name: Bilingual::new("المساعد العام", "Assistant général"),
            default_system_prompt: general_prompt.clone(),
            system_prompt: general_prompt,
            icon: "bot".to_string(),
            model: "gemini-2.5-pro".to_string(),
        },
        ChatChannel {
            id: PEDAGOGY_CHANNEL_ID.to_string(),
            name: Bilingual::new("المدرب البيداغوجي", "Coach pédagogique"),
            default_system_prompt: coach_prompt.clone(),
            system_prompt: coach_prompt,
            icon: "graduation-cap".to_string(),
            model: "gemini-2.5-flash".to_string(),
        },
    ]
}

pub fn resources() -> Vec<Resource> {
    vec![
        Resource {
            id: 1,
            title: Bilingual::new("دليل المتكون", "Guide du stagiaire"),
            kind: Bilingual::new("وثيقة", "Document"),
            link: "https://example.org/guide-stagiaire.pdf".to_string(),
        },
        Resource {
            id: 2,
            title: Bilingual::new("مقدمة في السلامة", "Introduction à la sécurité"),
            kind: Bilingual::new("فيديو", "Vidéo"),
            link: "https://example.org/videos/securite".to_string(),
        },
        Resource {
            id: 3,
            title: Bilingual::new("قاموس المصطلحات", "Glossaire"),
            kind: Bilingual::new("موقع", "Site web"),
            link: "https://example.org/glossaire".to_string(),
        },
    ]
}

pub fn progress_data() -> Vec<ProgressDataPoint> {
    [
        ("Jan", 40, 62, 90),
        ("Feb", 48, 65, 88),
        ("Mar", 55, 70, 92),
        ("Apr", 63, 72, 87),
        ("May", 71, 76, 91),
        ("Jun", 80, 79, 94),
    ]
    .into_iter()
    .map(|(month, completion, average_score, attendance)| ProgressDataPoint {
        month: month.to_string(),
        completion,
        average_score,
        attendance,
    })
    .collect()
}

pub fn platform_users() -> Vec<PlatformUser> {
    vec![
        PlatformUser {
            id: 1,
            name: "Administrateur".into(),
            email: "admin@tadrib.local".into(),
            phone: "0550000000".into(),
            specialization: "Gestion".into(),
            role: UserRole::Admin,
            status: UserStatus::Active,
            password: DEFAULT_ADMIN_PASSWORD.into(),
            must_change_password: None,
        },
        PlatformUser {
            id: 2,
            name: "Fatima Benali".into(),
            email: "f.benali@tadrib.local".into(),
            phone: "0551112233".into(),
            specialization: "Électricité".into(),
            role: UserRole::Trainer,
            status: UserStatus::Active,
            password: "formatrice2025".into(),
            must_change_password: Some(true),
        },
        PlatformUser {
            id: 3,
            name: "Karim Haddad".into(),
            email: "k.haddad@tadrib.local".into(),
            phone: "0554445566".into(),
            specialization: "Gestion".into(),
            role: UserRole::Trainee,
            status: UserStatus::Inactive,
            password: "stagiaire2025".into(),
            must_change_password: Some(true),
        },
    ]
}

pub fn completed_skills() -> Vec<i64> {
    Vec::new()
}

/// First message shown in a channel that has no saved history.
pub fn welcome_message(channel: &ChatChannel, assistant_name: &str) -> ChatMessage {
    let text = format!(
        "مرحبا! أنا {}. كيف يمكنني مساعدتك؟\nBonjour ! Je suis {}. Comment puis-je vous aider ?",
        channel.name.ar, channel.name.fr
    );
    let mut message = ChatMessage::new(assistant_name, ASSISTANT_AVATAR, text);
    message.id = 0;
    message
}
