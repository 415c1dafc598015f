use serde::Serialize;
use std::sync::LazyLock;

const MEMBER_PHOTO: &str = "https://images.unsplash.com/photo-1499996860823-5214fcc65f8f?q=80&w=1966&auto=format&fit=crop";

#[derive(Debug, Clone, Serialize)]
pub struct SiteMetadata {
    pub title: &'static str,
    pub description: &'static str,
}

#[derive(Debug, Clone, Serialize)]
pub struct NavLink {
    pub href: &'static str,
    pub label: &'static str,
}

#[derive(Debug, Clone, Serialize)]
pub struct FeatureCard {
    pub title: &'static str,
    pub description: &'static str,
    pub icon: &'static str,
}

#[derive(Debug, Clone, Serialize)]
pub struct TeamMember {
    pub name: &'static str,
    pub role: &'static str,
    pub image: &'static str,
    pub description: &'static str,
    pub achievements: Vec<&'static str>,
    pub linkedin: &'static str,
    pub github: &'static str,
}

/// Everything the landing page renders, minus styling.
#[derive(Debug, Clone, Serialize)]
pub struct SiteContent {
    pub metadata: SiteMetadata,
    pub nav: Vec<NavLink>,
    pub features: Vec<FeatureCard>,
    pub team: Vec<TeamMember>,
}

pub static SITE: LazyLock<SiteContent> = LazyLock::new(|| SiteContent {
    metadata: SiteMetadata {
        title: "ProjectX",
        description: "never setup db, auth , etc ever again in hackathon",
    },
    nav: vec![
        NavLink {
            href: "/",
            label: "Home",
        },
        NavLink {
            href: "/dashboard",
            label: "Dashboard",
        },
        NavLink {
            href: "/chatbot",
            label: "Chatbot",
        },
    ],
    features: vec![
        FeatureCard {
            title: "Feature One",
            description: "Description of the first main feature and why users will love it.",
            icon: "zap",
        },
        FeatureCard {
            title: "Feature Two",
            description: "Description of the second main feature and why users will love it.",
            icon: "star",
        },
        FeatureCard {
            title: "Feature Three",
            description: "Description of the third main feature and why users will love it.",
            icon: "users",
        },
    ],
    team: vec![
        TeamMember {
            name: "John Anderson",
            role: "Lead Frontend Developer",
            image: MEMBER_PHOTO,
            description: "Architected the UI system, implemented responsive design patterns and optimized performance.",
            achievements: vec![
                "Reduced page load time by 40%",
                "Implemented modern animation system",
                "Created reusable component library",
            ],
            linkedin: "https://linkedin.com/in/john-anderson",
            github: "https://github.com/johnanderson",
        },
        TeamMember {
            name: "Sarah Chen",
            role: "Backend Engineer",
            image: MEMBER_PHOTO,
            description: "Developed the API architecture, implemented authentication and optimized database queries.",
            achievements: vec![
                "Built scalable microservices",
                "Implemented real-time sync",
                "Optimized database performance",
            ],
            linkedin: "https://linkedin.com/in/sarah-chen",
            github: "https://github.com/sarahchen",
        },
        TeamMember {
            name: "Michael Rodriguez",
            role: "DevOps Specialist",
            image: MEMBER_PHOTO,
            description: "Set up CI/CD pipelines, managed cloud infrastructure and production monitoring.",
            achievements: vec![
                "Automated deployment process",
                "Container orchestration",
                "Monitoring dashboards",
            ],
            linkedin: "https://linkedin.com/in/michael-rodriguez",
            github: "https://github.com/michaelrodriguez",
        },
        TeamMember {
            name: "Emily Thompson",
            role: "AI/ML Engineer",
            image: MEMBER_PHOTO,
            description: "Integrated machine learning models and developed predictive analytics features.",
            achievements: vec![
                "Custom ML models",
                "35% better accuracy",
                "Real-time AI processing",
            ],
            linkedin: "https://linkedin.com/in/emily-thompson",
            github: "https://github.com/emilythompson",
        },
    ],
});

/// Actions offered by the dashboard shell.
pub static DASHBOARD_ACTIONS: LazyLock<Vec<NavLink>> = LazyLock::new(|| {
    vec![
        NavLink {
            href: "/chatbot",
            label: "Chatbot",
        },
        NavLink {
            href: "/auth/sign-out",
            label: "Sign out",
        },
    ]
});
