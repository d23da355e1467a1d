//! The navigation bar: a row of section links on wide screens, and a bottom
//! tab bar with an overflow menu on phones.

use maud::{Markup, html};

use crate::endpoints;

/// Where a section's link sits on small screens.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Placement {
    Tab,
    Overflow,
}

/// A top level area of the app.
#[derive(Debug)]
struct Section {
    url: &'static str,
    title: &'static str,
    placement: Placement,
}

impl Section {
    /// Whether `path` is the section's page or a page nested under it,
    /// e.g. `/wallets/3/edit` belongs to the wallets section.
    fn contains(&self, path: &str) -> bool {
        path.strip_prefix(self.url)
            .is_some_and(|rest| rest.is_empty() || rest.starts_with('/'))
    }
}

static SECTIONS: [Section; 6] = [
    Section {
        url: endpoints::DASHBOARD_VIEW,
        title: "Dashboard",
        placement: Placement::Tab,
    },
    Section {
        url: endpoints::TRANSACTIONS_VIEW,
        title: "Transactions",
        placement: Placement::Tab,
    },
    Section {
        url: endpoints::WALLETS_VIEW,
        title: "Wallets",
        placement: Placement::Tab,
    },
    Section {
        url: endpoints::BUDGETS_VIEW,
        title: "Budgets",
        placement: Placement::Overflow,
    },
    Section {
        url: endpoints::CATEGORIES_VIEW,
        title: "Categories",
        placement: Placement::Overflow,
    },
    Section {
        url: endpoints::LABELS_VIEW,
        title: "Labels",
        placement: Placement::Overflow,
    },
];

const DESKTOP_LINK_STYLE: &str = "block py-2 px-3 text-gray-900 rounded-sm hover:bg-gray-100 \
    lg:hover:bg-transparent lg:border-0 lg:hover:text-blue-700 lg:p-0 dark:text-white \
    lg:dark:hover:text-blue-500 dark:hover:bg-gray-700 dark:hover:text-white \
    lg:dark:hover:bg-transparent";
const DESKTOP_CURRENT_LINK_STYLE: &str = "block py-2 px-3 text-white bg-blue-700 rounded-sm \
    lg:bg-transparent lg:text-blue-700 lg:p-0 dark:text-white lg:dark:text-blue-500";

const TAB_STYLE: &str = "flex w-full min-w-0 items-center justify-center rounded-lg px-2.5 py-2 \
    text-xs font-semibold leading-tight sm:px-4 sm:text-sm cursor-pointer";
const TAB_IDLE_STYLE: &str = "text-gray-600 hover:bg-blue-50/70 hover:text-blue-700 \
    dark:text-gray-300 dark:hover:bg-blue-900/20 dark:hover:text-blue-200";
const TAB_CURRENT_STYLE: &str =
    "bg-blue-50 text-blue-700 shadow-sm dark:bg-blue-900/30 dark:text-blue-200";

const MENU_ITEM_STYLE: &str = "block rounded-lg px-3 py-2 text-gray-700 hover:bg-gray-100 \
    hover:text-blue-700 dark:text-gray-200 dark:hover:bg-gray-800/80 dark:hover:text-blue-200";
const MENU_CURRENT_ITEM_STYLE: &str =
    "block rounded-lg bg-blue-50 px-3 py-2 text-blue-700 dark:bg-blue-900/30 dark:text-blue-200";

fn tab_style(is_current: bool) -> String {
    let state = if is_current {
        TAB_CURRENT_STYLE
    } else {
        TAB_IDLE_STYLE
    };

    format!("{TAB_STYLE} {state}")
}

fn aria_current(is_current: bool) -> Option<&'static str> {
    is_current.then_some("page")
}

/// The navigation bar shown at the top of every page, or the bottom on small screens.
pub struct NavBar<'a> {
    current_path: &'a str,
}

impl NavBar<'_> {
    /// The navigation bar for the page at `current_path`. The section that
    /// contains the page is highlighted.
    pub fn new(current_path: &str) -> NavBar<'_> {
        NavBar { current_path }
    }

    fn current_section(&self) -> Option<&'static Section> {
        SECTIONS
            .iter()
            .find(|section| section.contains(self.current_path))
    }

    pub fn into_html(self) -> Markup {
        let current = self.current_section().map(|section| section.url);
        let is_current = |section: &Section| current == Some(section.url);
        let overflow_is_current = self
            .current_section()
            .is_some_and(|section| section.placement == Placement::Overflow);

        // Layout adapted from https://flowbite.com/docs/components/navbar/#default-navbar
        html! {
            nav class="bg-white border-gray-200 dark:bg-gray-900"
            {
                div class="max-w-screen-xl flex flex-wrap items-center justify-between mx-auto p-4"
                {
                    a href=(endpoints::ROOT) class="flex items-center space-x-3"
                    {
                        img src="/static/favicon-128x128.png" alt="Billfold Logo" class="h-8";
                        span class="self-center text-2xl font-semibold whitespace-nowrap dark:text-white"
                        {
                            "Billfold"
                        }
                    }

                    ul
                        class="hidden font-medium lg:flex lg:flex-row lg:space-x-8
                        lg:bg-white lg:dark:bg-gray-900"
                    {
                        @for section in &SECTIONS {
                            li
                            {
                                a
                                    href=(section.url)
                                    class=(if is_current(section) { DESKTOP_CURRENT_LINK_STYLE } else { DESKTOP_LINK_STYLE })
                                    aria-current=[aria_current(is_current(section))]
                                {
                                    (section.title)
                                }
                            }
                        }
                        li { a href=(endpoints::LOG_OUT) class=(DESKTOP_LINK_STYLE) { "Log out" } }
                    }
                }
            }

            nav class="fixed inset-x-0 bottom-0 z-40 lg:hidden" aria-label="Sections"
            {
                ul
                    class="mx-4 mb-4 grid grid-cols-4 gap-2 rounded-xl border border-gray-200
                    bg-white/95 px-4 py-3 shadow-lg backdrop-blur
                    dark:border-gray-700 dark:bg-gray-900/95"
                {
                    @for section in SECTIONS.iter().filter(|section| section.placement == Placement::Tab) {
                        li class="min-w-0"
                        {
                            a
                                href=(section.url)
                                class=(tab_style(is_current(section)))
                                aria-current=[aria_current(is_current(section))]
                            {
                                span class="truncate" { (section.title) }
                            }
                        }
                    }

                    li class="min-w-0"
                    {
                        details class="relative"
                        {
                            summary
                                class=(format!("list-none [&::-webkit-details-marker]:hidden {}", tab_style(overflow_is_current)))
                                aria-current=[aria_current(overflow_is_current)]
                            {
                                span class="truncate" { "More" }
                            }

                            ul
                                class="absolute bottom-full right-0 mb-3 flex w-40 flex-col gap-1
                                rounded-xl border border-gray-200 bg-white/95 p-2 text-sm
                                font-medium shadow-xl dark:border-gray-700 dark:bg-gray-900/95"
                            {
                                @for section in SECTIONS.iter().filter(|section| section.placement == Placement::Overflow) {
                                    li
                                    {
                                        a
                                            href=(section.url)
                                            class=(if is_current(section) { MENU_CURRENT_ITEM_STYLE } else { MENU_ITEM_STYLE })
                                            aria-current=[aria_current(is_current(section))]
                                        {
                                            (section.title)
                                        }
                                    }
                                }
                                li { a href=(endpoints::LOG_OUT) class=(MENU_ITEM_STYLE) { "Log out" } }
                            }
                        }
                    }
                }
            }
        }
    }
}
