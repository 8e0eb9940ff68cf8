//! Canonical skill catalog and alias table

use crate::config::MatchingConfig;
use crate::error::{Result, SkillTrendsError};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Maps an abbreviation or variant spelling onto one canonical skill
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AliasEntry {
    pub alias: String,
    pub canonical: String,
}

/// Ordered list of canonical skill names plus the alias table.
///
/// The catalog is validated once when it is built: two canonical names that only
/// differ by case, duplicate aliases, or aliases pointing at unknown skills are
/// rejected so matching never has to deal with them.
#[derive(Debug, Clone)]
pub struct SkillCatalog {
    skills: Vec<String>,
    aliases: Vec<AliasEntry>,
    canonical_index: HashMap<String, usize>,
}

impl SkillCatalog {
    pub fn new(skills: Vec<String>, aliases: Vec<AliasEntry>) -> Result<Self> {
        let mut canonical_index = HashMap::with_capacity(skills.len());

        for (idx, skill) in skills.iter().enumerate() {
            if skill.trim().is_empty() || skill.trim() != skill {
                return Err(SkillTrendsError::CatalogInconsistency(format!(
                    "invalid skill name {:?}",
                    skill
                )));
            }
            if let Some(previous) = canonical_index.insert(skill.to_lowercase(), idx) {
                return Err(SkillTrendsError::CatalogInconsistency(format!(
                    "'{}' duplicates '{}'",
                    skill, skills[previous]
                )));
            }
        }

        let mut seen_aliases: HashMap<String, &str> = HashMap::with_capacity(aliases.len());
        for entry in &aliases {
            let alias = entry.alias.trim().to_lowercase();
            if alias.is_empty() {
                return Err(SkillTrendsError::CatalogInconsistency(format!(
                    "empty alias for '{}'",
                    entry.canonical
                )));
            }
            if let Some(&idx) = canonical_index.get(&alias) {
                return Err(SkillTrendsError::CatalogInconsistency(format!(
                    "alias '{}' shadows catalog skill '{}'",
                    entry.alias, skills[idx]
                )));
            }
            if !skills.iter().any(|s| s == &entry.canonical) {
                return Err(SkillTrendsError::CatalogInconsistency(format!(
                    "alias '{}' points at unknown skill '{}'",
                    entry.alias, entry.canonical
                )));
            }
            if let Some(other) = seen_aliases.insert(alias, entry.canonical.as_str()) {
                return Err(SkillTrendsError::CatalogInconsistency(format!(
                    "alias '{}' is mapped to both '{}' and '{}'",
                    entry.alias, other, entry.canonical
                )));
            }
        }

        Ok(Self {
            skills,
            aliases,
            canonical_index,
        })
    }

    /// The built-in catalog
    pub fn builtin() -> Result<Self> {
        Self::with_custom(&MatchingConfig::default())
    }

    /// Built-in catalog extended with the configured skills and aliases
    pub fn with_custom(matching: &MatchingConfig) -> Result<Self> {
        let mut skills: Vec<String> = TECH_SKILLS
            .iter()
            .chain(SOFT_SKILLS.iter())
            .map(|s| s.to_string())
            .collect();
        skills.extend(matching.custom_skills.iter().map(|s| s.trim().to_string()));

        let mut aliases: Vec<AliasEntry> = DEFAULT_ALIASES
            .iter()
            .map(|(alias, canonical)| AliasEntry {
                alias: alias.to_string(),
                canonical: canonical.to_string(),
            })
            .collect();
        aliases.extend(matching.custom_aliases.iter().map(|(alias, canonical)| AliasEntry {
            alias: alias.clone(),
            canonical: canonical.clone(),
        }));

        Self::new(skills, aliases)
    }

    pub fn skills(&self) -> &[String] {
        &self.skills
    }

    pub fn aliases(&self) -> &[AliasEntry] {
        &self.aliases
    }

    pub fn len(&self) -> usize {
        self.skills.len()
    }

    pub fn is_empty(&self) -> bool {
        self.skills.is_empty()
    }

    pub fn contains(&self, skill: &str) -> bool {
        self.skills.iter().any(|s| s == skill)
    }

    /// Canonical spelling for a name in any casing
    pub fn canonical(&self, name: &str) -> Option<&str> {
        self.canonical_index
            .get(&name.trim().to_lowercase())
            .map(|&idx| self.skills[idx].as_str())
    }

    pub fn resolve_alias(&self, alias: &str) -> Option<&str> {
        let needle = alias.trim().to_lowercase();
        self.aliases
            .iter()
            .find(|entry| entry.alias.to_lowercase() == needle)
            .map(|entry| entry.canonical.as_str())
    }
}

const TECH_SKILLS: &[&str] = &[
    // Programming languages
    "Python", "JavaScript", "Java", "C++", "Ruby", "Go", "Swift", "Kotlin",
    "PHP", "Rust", "TypeScript", "HTML", "CSS", "SQL", "R", "MATLAB",
    "Bash", "Perl", "Scala", "Dart", "C#", "Objective-C", "Shell Scripting",
    "PowerShell", "Haskell", "Elixir", "Clojure", "Lua", "Julia", "F#",
    "Visual Basic", "Assembly Language", "Groovy", "Erlang", "COBOL",
    "Fortran", "Prolog", "C", "VB.NET",

    // Web technologies
    "React", "Angular", "Vue.js", "Node.js", "Express.js", "Django",
    "Flask", "Laravel", "Spring Boot", "ASP.NET", "jQuery", "Bootstrap",
    "Tailwind CSS", "SASS", "SCSS", "Webpack", "Vite", "Next.js", "Nuxt.js",
    "Svelte", "Ember.js", "Backbone.js", "Meteor", "Gatsby",

    // Databases
    "MySQL", "PostgreSQL", "MongoDB", "SQLite", "Oracle", "SQL Server",
    "Redis", "Cassandra", "DynamoDB", "Firebase", "Neo4j", "CouchDB",
    "MariaDB", "Elasticsearch", "InfluxDB", "Amazon RDS",

    // Cloud platforms
    "AWS", "Azure", "Google Cloud", "GCP", "Heroku", "DigitalOcean",
    "Vercel", "Netlify", "CloudFlare", "IBM Cloud", "Oracle Cloud",

    // DevOps and tooling
    "Docker", "Kubernetes", "Jenkins", "Git", "GitHub", "GitLab",
    "Bitbucket", "CI/CD", "Terraform", "Ansible", "Chef", "Puppet",
    "Vagrant", "CircleCI", "Travis CI", "GitHub Actions", "Bamboo",
    "Apache", "Nginx", "Tomcat", "IIS", "Helm", "Prometheus",

    // Mobile
    "React Native", "Flutter", "Xamarin", "Ionic", "Cordova",
    "Android Development", "iOS Development",

    // Data science and AI
    "TensorFlow", "PyTorch", "Keras", "Scikit-learn", "Pandas",
    "NumPy", "Matplotlib", "Seaborn", "Jupyter", "Apache Spark",
    "Hadoop", "Tableau", "Power BI", "D3.js", "OpenCV", "NLTK",
    "spaCy", "Plotly", "Bokeh",

    // Testing
    "Jest", "Mocha", "Cypress", "Selenium", "JUnit",
    "TestNG", "PyTest", "Postman", "Insomnia", "SoapUI",

    // Operating systems
    "Linux", "Windows", "macOS", "Ubuntu", "CentOS", "Red Hat",
    "Debian", "UNIX", "FreeBSD",

    // Version control
    "SVN", "Mercurial", "Perforce",

    // Editors
    "Visual Studio Code", "IntelliJ IDEA", "Eclipse", "Sublime Text",
    "Vim", "Emacs", "PyCharm", "WebStorm", "Xcode",
    "Android Studio", "Visual Studio",

    // Methodologies
    "Agile", "Scrum", "Kanban", "DevOps", "TDD", "BDD", "Waterfall",
    "Six Sigma", "ITIL",

    // Other technologies
    "REST API", "GraphQL", "SOAP", "Microservices", "Blockchain",
    "Machine Learning", "Artificial Intelligence", "Internet of Things",
    "Big Data", "Data Mining", "ETL", "API Development", "JSON",
    "XML", "YAML", "OAuth", "JWT", "SSL", "HTTPS", "WebSockets",
    "gRPC", "Apache Kafka", "RabbitMQ", "Message Queues",
];

const SOFT_SKILLS: &[&str] = &[
    "Communication", "Leadership", "Teamwork", "Problem Solving", "Critical Thinking",
    "Creativity", "Adaptability", "Time Management", "Project Management",
    "Collaboration", "Decision Making", "Conflict Resolution", "Emotional Intelligence",
    "Negotiation", "Presentation", "Mentoring", "Strategic Thinking",
    "Customer Service", "Interpersonal Skills",
];

const DEFAULT_ALIASES: &[(&str, &str)] = &[
    ("js", "JavaScript"),
    ("ts", "TypeScript"),
    ("nodejs", "Node.js"),
    ("reactjs", "React"),
    ("vuejs", "Vue.js"),
    ("nextjs", "Next.js"),
    ("nuxtjs", "Nuxt.js"),
    ("dotnet", "ASP.NET"),
    (".net", "ASP.NET"),
    ("csharp", "C#"),
    ("cplusplus", "C++"),
    ("c plus plus", "C++"),
    ("c sharp", "C#"),
    ("golang", "Go"),
    ("ai", "Artificial Intelligence"),
    ("ml", "Machine Learning"),
    ("k8s", "Kubernetes"),
    ("vscode", "Visual Studio Code"),
    ("vs code", "Visual Studio Code"),
    ("postgres", "PostgreSQL"),
    ("mongo", "MongoDB"),
    ("sklearn", "Scikit-learn"),
    ("iot", "Internet of Things"),
    ("rest", "REST API"),
    ("api", "API Development"),
    ("cicd", "CI/CD"),
];

#[cfg(test)]
mod tests {
    use super::*;

    fn entry(alias: &str, canonical: &str) -> AliasEntry {
        AliasEntry {
            alias: alias.to_string(),
            canonical: canonical.to_string(),
        }
    }

    #[test]
    fn test_builtin_catalog_is_consistent() {
        let catalog = SkillCatalog::builtin().unwrap();
        assert!(catalog.len() > 150);
        assert!(catalog.contains("JavaScript"));
        assert!(catalog.contains("Communication"));
        assert_eq!(catalog.resolve_alias("K8S"), Some("Kubernetes"));
    }

    #[test]
    fn test_alias_may_not_shadow_a_catalog_skill() {
        let result = SkillCatalog::new(
            vec!["Google Cloud".to_string(), "GCP".to_string()],
            vec![entry("gcp", "Google Cloud")],
        );
        assert!(matches!(result, Err(SkillTrendsError::CatalogInconsistency(_))));
    }

    #[test]
    fn test_case_only_duplicates_are_rejected() {
        let result = SkillCatalog::new(vec!["Python".to_string(), "python".to_string()], Vec::new());
        assert!(matches!(result, Err(SkillTrendsError::CatalogInconsistency(_))));
    }

    #[test]
    fn test_alias_must_target_catalog_skill() {
        let result = SkillCatalog::new(vec!["Rust".to_string()], vec![entry("dl", "Deep Learning")]);
        assert!(matches!(result, Err(SkillTrendsError::CatalogInconsistency(_))));
    }

    #[test]
    fn test_conflicting_aliases_are_rejected() {
        let result = SkillCatalog::new(
            vec!["Go".to_string(), "Google Cloud".to_string()],
            vec![entry("g", "Go"), entry("G", "Google Cloud")],
        );
        assert!(matches!(result, Err(SkillTrendsError::CatalogInconsistency(_))));
    }

    #[test]
    fn test_custom_skills_extend_builtin() {
        let mut matching = MatchingConfig::default();
        matching.custom_skills.push("Zig".to_string());
        matching.custom_aliases.insert("ziglang".to_string(), "Zig".to_string());

        let catalog = SkillCatalog::with_custom(&matching).unwrap();
        assert!(catalog.contains("Zig"));
        assert_eq!(catalog.resolve_alias("ziglang"), Some("Zig"));
    }

    #[test]
    fn test_custom_skill_colliding_with_builtin_fails_at_load() {
        let mut matching = MatchingConfig::default();
        matching.custom_skills.push("PYTHON".to_string());

        assert!(SkillCatalog::with_custom(&matching).is_err());
    }

    #[test]
    fn test_canonical_lookup_ignores_case() {
        let catalog = SkillCatalog::builtin().unwrap();
        assert_eq!(catalog.canonical("postgresql"), Some("PostgreSQL"));
        assert_eq!(catalog.canonical("unknown skill"), None);
    }
}
