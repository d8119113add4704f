//! Single-file website generator
//!
//! Pages are assembled from fixed Tailwind section templates chosen by the
//! kind of site the request asks for, followed by the retrieved components.

use std::fmt::Write as _;
use std::path::{Path, PathBuf};
use tracing::{debug, info};
use uiforge_common::Result;
use uiforge_vector::QueryResult;

/// File name written by [`write_page`]
pub const OUTPUT_FILE_NAME: &str = "website.html";

/// Kind of website a request describes
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SiteKind {
    Portfolio,
    Blog,
    Ecommerce,
    Landing,
    General,
}

impl SiteKind {
    /// Keyword match on the request, first group that hits wins
    pub fn detect(query: &str) -> Self {
        const KEYWORDS: [(SiteKind, &[&str]); 4] = [
            (SiteKind::Portfolio, &["portfolio", "resume", "cv"]),
            (SiteKind::Blog, &["blog", "article", "news"]),
            (SiteKind::Ecommerce, &["shop", "store", "ecommerce", "product"]),
            (SiteKind::Landing, &["landing", "marketing", "startup"]),
        ];

        let query = query.to_lowercase();
        KEYWORDS
            .iter()
            .find(|(_, words)| words.iter().any(|w| query.contains(w)))
            .map_or(SiteKind::General, |(kind, _)| *kind)
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            SiteKind::Portfolio => "portfolio",
            SiteKind::Blog => "blog",
            SiteKind::Ecommerce => "ecommerce",
            SiteKind::Landing => "landing",
            SiteKind::General => "general",
        }
    }

    fn nav_items(&self) -> [&'static str; 4] {
        match self {
            SiteKind::Portfolio => ["Home", "About", "Projects", "Contact"],
            SiteKind::Blog => ["Home", "Articles", "Categories", "About"],
            SiteKind::Ecommerce => ["Home", "Products", "Cart", "Account"],
            SiteKind::Landing | SiteKind::General => ["Home", "About", "Services", "Contact"],
        }
    }
}

/// Render a complete HTML5 page for `query`
pub fn render_page(query: &str, components: &[QueryResult]) -> String {
    let kind = SiteKind::detect(query);
    let title = escape_html(query);
    debug!("Rendering {} page with {} components", kind.as_str(), components.len());

    let mut html = String::with_capacity(16 * 1024);
    html.push_str("<!DOCTYPE html>\n<html lang=\"en\">\n<head>\n");
    html.push_str("    <meta charset=\"UTF-8\">\n");
    html.push_str(
        "    <meta name=\"viewport\" content=\"width=device-width, initial-scale=1.0\">\n",
    );
    let _ = writeln!(html, "    <title>{}</title>", title);
    html.push_str("    <script src=\"https://cdn.tailwindcss.com\"></script>\n");
    html.push_str("</head>\n");
    let _ = writeln!(html, "<body class=\"bg-gray-50\" data-site-kind=\"{}\">", kind.as_str());

    html.push_str(&header(kind));
    html.push_str(&hero(kind, &title));

    html.push_str("<main class=\"container mx-auto px-6 py-12\">\n");
    html.push_str(match kind {
        SiteKind::Portfolio => PORTFOLIO_SECTIONS,
        SiteKind::Blog => BLOG_SECTIONS,
        SiteKind::Ecommerce => ECOMMERCE_SECTIONS,
        SiteKind::Landing | SiteKind::General => GENERAL_SECTIONS,
    });
    html.push_str(&components_section(components));
    html.push_str("</main>\n");

    html.push_str(FOOTER);
    html.push_str("</body>\n</html>\n");
    html
}

/// Write `html` to `<output_dir>/website.html`
pub async fn write_page(html: &str, output_dir: &Path) -> Result<PathBuf> {
    tokio::fs::create_dir_all(output_dir).await?;
    let path = output_dir.join(OUTPUT_FILE_NAME);
    tokio::fs::write(&path, html).await?;
    info!("Website written to {} ({} bytes)", path.display(), html.len());
    Ok(path)
}

fn escape_html(text: &str) -> String {
    let mut escaped = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => escaped.push_str("&amp;"),
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            '"' => escaped.push_str("&quot;"),
            '\'' => escaped.push_str("&#39;"),
            _ => escaped.push(c),
        }
    }
    escaped
}

fn header(kind: SiteKind) -> String {
    let mut header = String::from(
        r##"
    <header class="bg-white shadow-sm sticky top-0 z-50">
        <nav class="container mx-auto px-6 py-4">
            <div class="flex items-center justify-between">
                <div class="text-2xl font-bold text-blue-600">Brand</div>
                <div class="hidden md:flex space-x-8">
"##,
    );
    for item in kind.nav_items() {
        let _ = writeln!(
            header,
            "                    <a href=\"#{}\" class=\"text-gray-700 hover:text-blue-600 transition\">{}</a>",
            item.to_lowercase(),
            item
        );
    }
    header.push_str(
        r##"                </div>
                <button class="md:hidden text-gray-700">
                    <svg class="w-6 h-6" fill="none" stroke="currentColor" viewBox="0 0 24 24">
                        <path stroke-linecap="round" stroke-linejoin="round" stroke-width="2" d="M4 6h16M4 12h16M4 18h16"/>
                    </svg>
                </button>
            </div>
        </nav>
    </header>
"##,
    );
    header
}

/// `title` must already be escaped
fn hero(kind: SiteKind, title: &str) -> String {
    match kind {
        SiteKind::Portfolio => r##"
    <section class="bg-gradient-to-r from-blue-600 to-purple-600 text-white py-20">
        <div class="container mx-auto px-6">
            <div class="max-w-3xl">
                <h1 class="text-5xl font-bold mb-4">Hi, I'm John Doe</h1>
                <p class="text-xl mb-8">Full Stack Developer &amp; UI/UX Designer</p>
                <p class="text-lg mb-8 opacity-90">I create beautiful, functional websites and applications that solve real problems.</p>
                <div class="flex space-x-4">
                    <button class="bg-white text-blue-600 px-8 py-3 rounded-lg font-semibold hover:bg-gray-100 transition">View Projects</button>
                    <button class="border-2 border-white text-white px-8 py-3 rounded-lg font-semibold hover:bg-white hover:text-blue-600 transition">Contact Me</button>
                </div>
            </div>
        </div>
    </section>
"##
        .to_string(),
        SiteKind::Blog => r##"
    <section class="bg-gradient-to-r from-green-600 to-teal-600 text-white py-20">
        <div class="container mx-auto px-6 text-center">
            <h1 class="text-5xl font-bold mb-4">Tech Blog</h1>
            <p class="text-xl mb-8">Insights, tutorials, and stories about web development</p>
            <div class="max-w-xl mx-auto">
                <div class="relative">
                    <input type="text" placeholder="Search articles..." class="w-full px-6 py-4 rounded-lg text-gray-800 focus:outline-none focus:ring-2 focus:ring-white"/>
                    <button class="absolute right-2 top-2 bg-green-600 text-white px-6 py-2 rounded-lg">Search</button>
                </div>
            </div>
        </div>
    </section>
"##
        .to_string(),
        SiteKind::Ecommerce | SiteKind::Landing | SiteKind::General => format!(
            r##"
    <section class="bg-gradient-to-r from-blue-600 to-indigo-600 text-white py-20">
        <div class="container mx-auto px-6 text-center">
            <h1 class="text-5xl font-bold mb-4">{}</h1>
            <p class="text-xl mb-8">Professional, modern, and responsive solution</p>
            <button class="bg-white text-blue-600 px-8 py-3 rounded-lg font-semibold hover:bg-gray-100 transition">Get Started</button>
        </div>
    </section>
"##,
            title
        ),
    }
}

fn components_section(components: &[QueryResult]) -> String {
    let mut section = String::from(
        r##"
    <section id="components" class="mb-16">
        <h2 class="text-3xl font-bold text-gray-800 mb-6">Components</h2>
        <div class="space-y-8">
"##,
    );

    for result in components {
        let record = &result.metadata;
        let _ = write!(
            section,
            r##"            <div class="bg-white rounded-lg shadow-md p-6" data-component-id="{id}">
                <div class="flex items-center justify-between mb-4">
                    <h3 class="text-xl font-bold text-gray-800">{name}</h3>
                    <span class="text-sm text-gray-500">{category} &middot; score {score:.3}</span>
                </div>
                {snippet}
            </div>
"##,
            id = escape_html(&record.component_id),
            name = escape_html(&record.name),
            category = escape_html(&record.category),
            score = result.similarity_score,
            snippet = record.code_snippet,
        );
    }

    section.push_str("        </div>\n    </section>\n");
    section
}

const PORTFOLIO_SECTIONS: &str = r##"
    <section id="about" class="mb-16">
        <h2 class="text-3xl font-bold text-gray-800 mb-6">About Me</h2>
        <div class="bg-white rounded-lg shadow-md p-8">
            <p class="text-gray-600 mb-4">I'm a passionate developer with 5+ years of experience building web applications.</p>
            <div class="grid grid-cols-1 md:grid-cols-3 gap-6 mt-8">
                <div class="text-center"><div class="text-4xl font-bold text-blue-600 mb-2">50+</div><div class="text-gray-600">Projects Completed</div></div>
                <div class="text-center"><div class="text-4xl font-bold text-blue-600 mb-2">30+</div><div class="text-gray-600">Happy Clients</div></div>
                <div class="text-center"><div class="text-4xl font-bold text-blue-600 mb-2">5+</div><div class="text-gray-600">Years Experience</div></div>
            </div>
        </div>
    </section>

    <section id="projects" class="mb-16">
        <h2 class="text-3xl font-bold text-gray-800 mb-6">Featured Projects</h2>
        <div class="grid grid-cols-1 md:grid-cols-2 lg:grid-cols-3 gap-8">
            <div class="bg-white rounded-lg shadow-md overflow-hidden hover:shadow-xl transition">
                <div class="h-48 bg-gradient-to-r from-blue-500 to-purple-500"></div>
                <div class="p-6"><h3 class="text-xl font-bold text-gray-800 mb-2">E-commerce Platform</h3><p class="text-gray-600">Full-stack e-commerce solution</p></div>
            </div>
            <div class="bg-white rounded-lg shadow-md overflow-hidden hover:shadow-xl transition">
                <div class="h-48 bg-gradient-to-r from-green-500 to-teal-500"></div>
                <div class="p-6"><h3 class="text-xl font-bold text-gray-800 mb-2">Analytics Dashboard</h3><p class="text-gray-600">Real-time data visualization dashboard</p></div>
            </div>
            <div class="bg-white rounded-lg shadow-md overflow-hidden hover:shadow-xl transition">
                <div class="h-48 bg-gradient-to-r from-pink-500 to-red-500"></div>
                <div class="p-6"><h3 class="text-xl font-bold text-gray-800 mb-2">Mobile App</h3><p class="text-gray-600">Cross-platform mobile application</p></div>
            </div>
        </div>
    </section>

    <section id="contact" class="mb-16">
        <h2 class="text-3xl font-bold text-gray-800 mb-6">Get In Touch</h2>
        <div class="bg-white rounded-lg shadow-md p-8">
            <form class="space-y-6">
                <input type="text" class="w-full px-4 py-2 border border-gray-300 rounded-lg" placeholder="Your name"/>
                <input type="email" class="w-full px-4 py-2 border border-gray-300 rounded-lg" placeholder="your@email.com"/>
                <textarea rows="4" class="w-full px-4 py-2 border border-gray-300 rounded-lg" placeholder="Your message"></textarea>
                <button type="submit" class="bg-blue-600 text-white px-8 py-3 rounded-lg font-semibold hover:bg-blue-700 transition">Send Message</button>
            </form>
        </div>
    </section>
"##;

const BLOG_SECTIONS: &str = r##"
    <section id="articles" class="mb-16">
        <h2 class="text-3xl font-bold text-gray-800 mb-6">Latest Articles</h2>
        <div class="grid grid-cols-1 md:grid-cols-2 gap-8">
            <article class="bg-white rounded-lg shadow-md overflow-hidden">
                <div class="h-48 bg-gradient-to-r from-blue-500 to-purple-500"></div>
                <div class="p-6">
                    <h3 class="text-2xl font-bold text-gray-800 mb-3">Getting Started with React Hooks</h3>
                    <p class="text-gray-600 mb-4">Learn how to use React Hooks to manage state and side effects in your functional components.</p>
                    <a href="#" class="text-blue-600 font-semibold hover:text-blue-700">Read More &rarr;</a>
                </div>
            </article>
            <article class="bg-white rounded-lg shadow-md overflow-hidden">
                <div class="h-48 bg-gradient-to-r from-green-500 to-teal-500"></div>
                <div class="p-6">
                    <h3 class="text-2xl font-bold text-gray-800 mb-3">Building RESTful APIs with Node.js</h3>
                    <p class="text-gray-600 mb-4">A comprehensive guide to creating scalable REST APIs using Express and Node.js.</p>
                    <a href="#" class="text-blue-600 font-semibold hover:text-blue-700">Read More &rarr;</a>
                </div>
            </article>
        </div>
    </section>

    <section id="categories" class="mb-16">
        <h2 class="text-3xl font-bold text-gray-800 mb-6">Browse by Category</h2>
        <div class="grid grid-cols-2 md:grid-cols-4 gap-4">
            <a href="#" class="bg-white p-6 rounded-lg shadow-md text-center hover:shadow-xl transition"><div class="font-semibold text-gray-800">React</div><div class="text-sm text-gray-500">24 posts</div></a>
            <a href="#" class="bg-white p-6 rounded-lg shadow-md text-center hover:shadow-xl transition"><div class="font-semibold text-gray-800">Node.js</div><div class="text-sm text-gray-500">18 posts</div></a>
            <a href="#" class="bg-white p-6 rounded-lg shadow-md text-center hover:shadow-xl transition"><div class="font-semibold text-gray-800">CSS</div><div class="text-sm text-gray-500">15 posts</div></a>
            <a href="#" class="bg-white p-6 rounded-lg shadow-md text-center hover:shadow-xl transition"><div class="font-semibold text-gray-800">Database</div><div class="text-sm text-gray-500">12 posts</div></a>
        </div>
    </section>
"##;

const ECOMMERCE_SECTIONS: &str = r##"
    <section id="products" class="mb-16">
        <h2 class="text-3xl font-bold text-gray-800 mb-6">Featured Products</h2>
        <div class="grid grid-cols-1 md:grid-cols-3 lg:grid-cols-4 gap-6">
            <div class="bg-white rounded-lg shadow-md overflow-hidden group">
                <div class="h-64 bg-gradient-to-br from-blue-400 to-purple-500"></div>
                <div class="p-4 flex items-center justify-between"><span class="text-xl font-bold text-blue-600">$99.99</span><button class="bg-blue-600 text-white px-4 py-2 rounded-lg text-sm hover:bg-blue-700">Add to Cart</button></div>
            </div>
            <div class="bg-white rounded-lg shadow-md overflow-hidden group">
                <div class="h-64 bg-gradient-to-br from-green-400 to-teal-500"></div>
                <div class="p-4 flex items-center justify-between"><span class="text-xl font-bold text-blue-600">$79.99</span><button class="bg-blue-600 text-white px-4 py-2 rounded-lg text-sm hover:bg-blue-700">Add to Cart</button></div>
            </div>
            <div class="bg-white rounded-lg shadow-md overflow-hidden group">
                <div class="h-64 bg-gradient-to-br from-pink-400 to-red-500"></div>
                <div class="p-4 flex items-center justify-between"><span class="text-xl font-bold text-blue-600">$129.99</span><button class="bg-blue-600 text-white px-4 py-2 rounded-lg text-sm hover:bg-blue-700">Add to Cart</button></div>
            </div>
            <div class="bg-white rounded-lg shadow-md overflow-hidden group">
                <div class="h-64 bg-gradient-to-br from-yellow-400 to-orange-500"></div>
                <div class="p-4 flex items-center justify-between"><span class="text-xl font-bold text-blue-600">$89.99</span><button class="bg-blue-600 text-white px-4 py-2 rounded-lg text-sm hover:bg-blue-700">Add to Cart</button></div>
            </div>
        </div>
    </section>
"##;

const GENERAL_SECTIONS: &str = r##"
    <section id="services" class="mb-16">
        <h2 class="text-3xl font-bold text-gray-800 mb-6 text-center">Our Features</h2>
        <div class="grid grid-cols-1 md:grid-cols-3 gap-8">
            <div class="bg-white p-8 rounded-lg shadow-md text-center"><h3 class="text-xl font-bold text-gray-800 mb-3">Fast Performance</h3><p class="text-gray-600">Lightning-fast loading times and optimized performance.</p></div>
            <div class="bg-white p-8 rounded-lg shadow-md text-center"><h3 class="text-xl font-bold text-gray-800 mb-3">Beautiful Design</h3><p class="text-gray-600">Modern, clean, and responsive user interface.</p></div>
            <div class="bg-white p-8 rounded-lg shadow-md text-center"><h3 class="text-xl font-bold text-gray-800 mb-3">Secure</h3><p class="text-gray-600">Enterprise-level security and data protection.</p></div>
        </div>
    </section>

    <section id="about" class="mb-16">
        <div class="bg-white rounded-lg shadow-md p-8">
            <h2 class="text-2xl font-bold text-gray-800 mb-4">About Our Service</h2>
            <p class="text-gray-600 mb-6">We provide professional, reliable, and innovative solutions to help your business grow.</p>
            <button class="bg-blue-600 text-white px-6 py-3 rounded-lg hover:bg-blue-700 transition">Learn More</button>
        </div>
    </section>
"##;

const FOOTER: &str = r##"
    <footer class="bg-gray-800 text-white py-12">
        <div class="container mx-auto px-6">
            <div class="grid grid-cols-1 md:grid-cols-3 gap-8">
                <div>
                    <h3 class="text-xl font-bold mb-4">Brand</h3>
                    <p class="text-gray-400">Building amazing web experiences.</p>
                </div>
                <div>
                    <h4 class="font-semibold mb-4">Quick Links</h4>
                    <ul class="space-y-2">
                        <li><a href="#home" class="text-gray-400 hover:text-white">Home</a></li>
                        <li><a href="#about" class="text-gray-400 hover:text-white">About</a></li>
                        <li><a href="#contact" class="text-gray-400 hover:text-white">Contact</a></li>
                    </ul>
                </div>
                <div>
                    <h4 class="font-semibold mb-4">Follow Us</h4>
                    <div class="flex space-x-4">
                        <a href="#" class="text-gray-400 hover:text-white">Twitter</a>
                        <a href="#" class="text-gray-400 hover:text-white">GitHub</a>
                        <a href="#" class="text-gray-400 hover:text-white">LinkedIn</a>
                    </div>
                </div>
            </div>
            <div class="border-t border-gray-700 mt-8 pt-8 text-center text-gray-400">
                <p>&copy; Brand. All rights reserved.</p>
            </div>
        </div>
    </footer>
"##;
